//! SupervisorBuilder - Supervisor の構築とワイヤリング
//!
//! # 使用例
//! ```ignore
//! let supervisor = SupervisorBuilder::new(config)
//!     .handlers(Arc::new(registry))
//!     .require_registered_handlers()
//!     .build()?;
//! let closed = supervisor.run().await?;
//! ```
//!
//! # Fail-fast 設計
//! - `require_registered_handlers()` を指定すると、build() 時に
//!   「設定が参照する handler ⊆ 登録済み handler」をチェック
//! - 指定しない場合は実行時に NotFound で Worker が落ち、再起動対象になる

use std::sync::Arc;

use tracing::debug;

use super::plan::WorkerPlan;
use super::supervisor::Supervisor;
use crate::domain::{ConfigDocument, ConfigError};
use crate::handler::{HandlerInvoker, HandlerRegistry};
use crate::impls::DiscordWebhook;
use crate::ports::{Clock, NoopNotifier, Notifier, SystemClock};

/// BuildError は Supervisor 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Missing handlers: {0:?}. These handlers are referenced by queues but not registered.")]
    MissingHandlers(Vec<String>),

    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

pub struct SupervisorBuilder {
    config: ConfigDocument,
    handlers: Option<Arc<HandlerRegistry>>,
    notifier: Option<Arc<dyn Notifier>>,
    clock: Option<Arc<dyn Clock>>,
    require_registered: bool,
}

impl SupervisorBuilder {
    pub fn new(config: ConfigDocument) -> Self {
        Self {
            config,
            handlers: None,
            notifier: None,
            clock: None,
            require_registered: false,
        }
    }

    pub fn handlers(mut self, registry: Arc<HandlerRegistry>) -> Self {
        self.handlers = Some(registry);
        self
    }

    /// 省略時は `notifications.discord.webhook_url` があれば Discord、なければ何もしない
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// 省略時は SystemClock
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn require_registered_handlers(mut self) -> Self {
        self.require_registered = true;
        self
    }

    pub fn build(self) -> Result<Supervisor, BuildError> {
        let registry = self.handlers.unwrap_or_default();

        if self.require_registered {
            let plan = WorkerPlan::from_config(&self.config)?;
            let missing: Vec<String> = plan
                .handler_names()
                .into_iter()
                .filter(|h| !registry.contains(h))
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingHandlers(missing));
            }
        }

        let notifier = match self.notifier {
            Some(notifier) => notifier,
            None => default_notifier(&self.config)?,
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(Supervisor::new(
            self.config,
            HandlerInvoker::new(registry),
            notifier,
            clock,
        ))
    }
}

fn default_notifier(config: &ConfigDocument) -> Result<Arc<dyn Notifier>, BuildError> {
    match config.discord_webhook_url() {
        Some(url) => {
            debug!("discord notifications enabled");
            let webhook =
                DiscordWebhook::new(url).map_err(|e| BuildError::HttpClient(e.to_string()))?;
            Ok(Arc::new(webhook))
        }
        None => Ok(Arc::new(NoopNotifier)),
    }
}
