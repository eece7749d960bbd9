//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部（ファイル、通知先、時刻）へのインターフェースを提供し、
//! Supervisor からは実装の詳細を隠蔽します。

pub mod clock;
pub mod config_loader;
pub mod notifier;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, ManualClock, SystemClock};
pub use self::config_loader::ConfigLoader;
pub use self::notifier::{NoopNotifier, Notifier};
