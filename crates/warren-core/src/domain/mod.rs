//! Domain model (設定ドキュメント, キュー定義, エラー型).

pub mod config;
pub mod errors;
pub mod queue;

pub use self::config::{
    ConfigDocument, LoggingSettings, RabbitMqSettings, DEFAULT_HEARTBEAT, DEFAULT_MAX_RESTARTS,
};
pub use self::errors::{ConfigError, FailureKind, HandlerError, InvocationFailure};
pub use self::queue::{QueueDescriptor, QueueName};
