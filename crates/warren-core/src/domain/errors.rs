//! Errors - エラー型と分類
//!
//! - **ConfigError**: 起動時の設定エラー（致命的、リトライしない）
//! - **InvocationFailure**: Handler 実行の失敗（Worker 内に閉じる）
//! - **HandlerError**: ユーザー定義の method が返すエラー

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// ConfigError は Starting フェーズで発生する設定エラー
///
/// どれも致命的で、Worker が 1 つも起動していない段階でプロセスを止める。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    ConfigFileNotFound(String),

    #[error("invalid configuration file content: {0}")]
    ConfigInvalidContent(String),

    #[error("there are no queues for {0}")]
    QueueNotFound(String),

    #[error("there are no contexts in the configuration")]
    ContextNotFound,

    #[error("handler class not found for {0} queue")]
    HandlerClassNotFound(String),

    #[error("method not found for {0} queue")]
    MethodNotFound(String),
}

/// FailureKind は InvocationFailure の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// handler か method が capability テーブルに存在しない
    NotFound,
    /// 引数が method の Args 型に decode できない
    InvalidArguments,
    /// method が Err を返した
    Failed,
    /// method が panic した
    Panicked,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::NotFound => "NotFound",
            FailureKind::InvalidArguments => "InvalidArguments",
            FailureKind::Failed => "Failed",
            FailureKind::Panicked => "Panicked",
        };
        f.write_str(s)
    }
}

/// InvocationFailure は HandlerInvoker が返す唯一のエラー
///
/// 診断用に handler / method / args と元のメッセージを保持する。
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} while invoking {handler}#{method} with {args:?}: {message}")]
pub struct InvocationFailure {
    pub kind: FailureKind,
    pub handler: String,
    pub method: String,
    pub args: Vec<Value>,
    pub message: String,
}

impl InvocationFailure {
    pub fn new(
        kind: FailureKind,
        handler: &str,
        method: &str,
        args: &[Value],
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            handler: handler.to_string(),
            method: method.to_string(),
            args: args.to_vec(),
            message: message.into(),
        }
    }
}

/// HandlerError はユーザー定義の method が返すエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub(crate) fn kind(&self) -> FailureKind {
        match self {
            HandlerError::InvalidArguments(_) => FailureKind::InvalidArguments,
            HandlerError::Failed(_) => FailureKind::Failed,
        }
    }
}
