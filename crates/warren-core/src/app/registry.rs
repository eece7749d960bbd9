//! WorkerRegistry - キュー名 → WorkerHandle
//!
//! # 設計
//! - Supervisor が値として所有し、監視ループからだけ変更する（ロック不要）
//! - 再起動時は同じキーのエントリを上書きする（削除しない）
//! - 走査順は最初に spawn した順

use std::collections::HashMap;

use super::worker::WorkerHandle;
use crate::domain::QueueName;

#[derive(Default)]
pub struct WorkerRegistry {
    order: Vec<QueueName>,
    handles: HashMap<QueueName, WorkerHandle>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録または上書き。上書きした場合は以前の handle を返す。
    pub fn set(&mut self, queue: QueueName, handle: WorkerHandle) -> Option<WorkerHandle> {
        let previous = self.handles.insert(queue.clone(), handle);
        if previous.is_none() {
            self.order.push(queue);
        }
        previous
    }

    pub fn get(&self, queue: &QueueName) -> Option<&WorkerHandle> {
        self.handles.get(queue)
    }

    /// 挿入順の (キュー名, handle) 列
    pub fn iter(&self) -> impl Iterator<Item = (&QueueName, &WorkerHandle)> {
        self.order
            .iter()
            .filter_map(|q| self.handles.get(q).map(|h| (q, h)))
    }

    /// 今この瞬間に停止しているキュー（挿入順のスナップショット）
    pub fn dead_queues(&self) -> Vec<QueueName> {
        self.iter()
            .filter(|(_, handle)| !handle.is_alive())
            .map(|(queue, _)| queue.clone())
            .collect()
    }

    pub fn alive_count(&self) -> usize {
        self.iter().filter(|(_, handle)| handle.is_alive()).count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::worker::WorkerSpec;
    use crate::handler::{Capability, HandlerInvoker, HandlerRegistry};
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;

    fn invoker() -> HandlerInvoker {
        let mut registry = HandlerRegistry::new();
        registry
            .register(Capability::new("Forever").method_fn("run", |_| async {
                std::future::pending::<()>().await;
                Ok(Value::Null)
            }))
            .unwrap();
        HandlerInvoker::new(Arc::new(registry))
    }

    fn spawn(queue: &str, handler: &str, invoker: &HandlerInvoker) -> WorkerHandle {
        let spec = WorkerSpec::new(QueueName::new(queue), handler, "run", vec![]);
        WorkerHandle::spawn(Arc::new(spec), invoker.clone())
    }

    async fn settle(registry: &WorkerRegistry, expected_dead: usize) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while registry.dead_queues().len() < expected_dead {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn iterates_in_first_insertion_order() {
        let invoker = invoker();
        let mut registry = WorkerRegistry::new();
        for q in ["c", "a", "b"] {
            registry.set(QueueName::new(q), spawn(q, "Forever", &invoker));
        }

        let order: Vec<&str> = registry.iter().map(|(q, _)| q.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn overwrite_keeps_size_and_position() {
        let invoker = invoker();
        let mut registry = WorkerRegistry::new();
        registry.set(QueueName::new("a"), spawn("a", "Forever", &invoker));
        registry.set(QueueName::new("b"), spawn("b", "Forever", &invoker));

        let previous = registry.set(QueueName::new("a"), spawn("a", "Forever", &invoker));

        assert!(previous.is_some());
        assert_eq!(registry.len(), 2);
        let order: Vec<&str> = registry.iter().map(|(q, _)| q.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn reports_dead_and_alive_workers() {
        let invoker = invoker();
        let mut registry = WorkerRegistry::new();
        registry.set(QueueName::new("live"), spawn("live", "Forever", &invoker));
        registry.set(QueueName::new("dead"), spawn("dead", "Missing", &invoker));

        settle(&registry, 1).await;

        assert_eq!(registry.dead_queues(), vec![QueueName::new("dead")]);
        assert_eq!(registry.alive_count(), 1);
        assert!(registry.get(&QueueName::new("live")).unwrap().is_alive());
    }
}
