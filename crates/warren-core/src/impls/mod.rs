//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **FileConfigLoader**: YAML ファイル + `${VAR}` テンプレート
//! - **DiscordWebhook**: Closing 通知の送信先
//! - **ConsumerInspector**: RabbitMQ Management API によるコンシューマ確認

pub mod discord;
pub mod file_config;
pub mod rabbitmq;
pub mod template;

// 主要な型を再エクスポート
pub use self::discord::DiscordWebhook;
pub use self::file_config::{FileConfigLoader, DEFAULT_CONFIG_PATH};
pub use self::rabbitmq::ConsumerInspector;
