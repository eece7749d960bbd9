//! warren-core
//!
//! Core building blocks for the Warren consumer supervisor.
//!
//! # モジュール構成
//! - **domain**: 設定ドキュメント、キュー記述子、エラー型
//! - **handler**: capability テーブル（HandlerRegistry）と HandlerInvoker
//! - **ports**: 抽象化レイヤー（Clock, Notifier, ConfigLoader）
//! - **app**: Supervisor と Worker（builder, plan, registry, supervisor, worker）
//! - **impls**: 実装（FileConfigLoader, DiscordWebhook, ConsumerInspector）
//! - **logging**: tracing subscriber の初期化

pub mod app;
pub mod domain;
pub mod handler;
pub mod impls;
pub mod logging;
pub mod ports;
