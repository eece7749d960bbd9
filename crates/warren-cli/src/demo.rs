//! 同梱のデモ capability
//!
//! 本物のブローカーに繋がずに Supervisor の挙動を確かめるためのもの。
//! - `Heartbeat.run`: 一定間隔でログを出し続ける（止まらない Worker）
//! - `Flaky.consume`: 指定秒数後に失敗する（再起動の確認用）
//! - `Echo.call`: 引数をログに出してすぐ戻る（正常終了も再起動される）

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use warren_core::domain::HandlerError;
use warren_core::handler::{Capability, HandlerRegistry, Method, RegistryError};

#[derive(Debug, Deserialize)]
pub struct HeartbeatArgs {
    #[serde(default = "default_interval")]
    pub interval: f64,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_interval() -> f64 {
    1.0
}

pub struct Heartbeat;

#[async_trait]
impl Method for Heartbeat {
    type Args = (HeartbeatArgs,);
    type Output = ();

    async fn call(&self, (args,): Self::Args) -> Result<(), HandlerError> {
        let interval = Duration::try_from_secs_f64(args.interval)
            .map_err(|e| HandlerError::InvalidArguments(format!("interval: {e}")))?;
        let message = args.message.unwrap_or_else(|| "alive".to_string());

        let mut beats: u64 = 0;
        loop {
            beats += 1;
            info!(beats, "{message}");
            tokio::time::sleep(interval).await;
        }
    }
}

/// インスタンスごとに試行回数を数える。factory 登録なので毎回 0 から。
pub struct Flaky {
    attempts: AtomicU32,
}

#[async_trait]
impl Method for Flaky {
    type Args = (f64,);
    type Output = ();

    async fn call(&self, (fail_after,): Self::Args) -> Result<(), HandlerError> {
        let delay = Duration::try_from_secs_f64(fail_after)
            .map_err(|e| HandlerError::InvalidArguments(format!("fail_after: {e}")))?;
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;

        tokio::time::sleep(delay).await;
        Err(HandlerError::failed(format!(
            "simulated consumer failure (attempt {attempt})"
        )))
    }
}

/// デモ用の capability テーブル
pub fn registry() -> Result<HandlerRegistry, RegistryError> {
    let mut registry = HandlerRegistry::new();

    registry.register(Capability::new("Heartbeat").method("run", Heartbeat))?;

    registry.register_factory("Flaky", || {
        Capability::new("Flaky").method(
            "consume",
            Flaky {
                attempts: AtomicU32::new(0),
            },
        )
    })?;

    registry.register(Capability::new("Echo").method_fn("call", |args: Vec<Value>| async move {
        info!(?args, "echo");
        Ok(Value::Array(args))
    }))?;

    Ok(registry)
}

/// `Arc` 化した registry（SupervisorBuilder 用）
pub fn shared_registry() -> Result<Arc<HandlerRegistry>, RegistryError> {
    registry().map(Arc::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use warren_core::domain::FailureKind;
    use warren_core::handler::HandlerInvoker;

    fn invoker() -> HandlerInvoker {
        HandlerInvoker::new(shared_registry().unwrap())
    }

    #[test]
    fn registers_all_demo_capabilities() {
        assert_eq!(
            registry().unwrap().registered_handlers(),
            vec!["Echo", "Flaky", "Heartbeat"]
        );
    }

    #[tokio::test]
    async fn echo_returns_its_arguments() {
        let out = invoker()
            .invoke("Echo", "call", vec![json!("a"), json!(1)])
            .await
            .unwrap();
        assert_eq!(out, json!(["a", 1]));
    }

    #[tokio::test]
    async fn flaky_fails_after_delay() {
        let err = invoker()
            .invoke("Flaky", "consume", vec![json!(0)])
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::Failed);
        assert!(err.message.contains("attempt 1"));
    }

    #[tokio::test]
    async fn flaky_counts_from_zero_per_invocation() {
        let invoker = invoker();
        for _ in 0..2 {
            let err = invoker
                .invoke("Flaky", "consume", vec![json!(0.0)])
                .await
                .unwrap_err();
            assert!(err.message.contains("attempt 1"));
        }
    }

    #[tokio::test]
    async fn heartbeat_rejects_negative_interval() {
        let err = invoker()
            .invoke("Heartbeat", "run", vec![json!({ "interval": -1.0 })])
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidArguments);
    }

    #[tokio::test]
    async fn heartbeat_requires_an_object() {
        let err = invoker().invoke("Heartbeat", "run", vec![]).await.unwrap_err();
        assert_matches!(err.kind, FailureKind::InvalidArguments);
    }
}
