//! Logging - tracing subscriber の初期化
//!
//! stdout と日次ローテーションのファイルの 2 レイヤー。
//! レベルは `logging.level` が既定で、`RUST_LOG` があればそちらが優先される。

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::domain::LoggingSettings;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("init logging error: `{0}`")]
    TryInitError(String),
    #[error("invalid logging file path: `{0}`")]
    InvalidFilePath(String),
    #[error("invalid logging level: `{0}`")]
    InvalidLevel(String),
}

/// グローバル subscriber を設定する
///
/// 戻り値の guard を drop するとファイル書き込みスレッドが flush して止まる。
/// プロセス終了まで保持すること。
pub fn try_init(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, LoggingError> {
    let level = parse_level(&settings.level)?;

    let appender = file_appender(&settings.path, settings.shift_count)?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_filter(env_filter(level));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_filter(env_filter(level));

    tracing_subscriber::Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::TryInitError(e.to_string()))?;

    debug!(path = %settings.path.display(), "Logging initialized successfully");
    Ok(Some(guard))
}

fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| LoggingError::InvalidLevel(level.to_string()))
}

fn env_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

/// `path` の親ディレクトリを作り、`shift_count + 1` 世代を保持するローテーション設定を返す
fn file_appender(path: &Path, shift_count: usize) -> Result<RollingFileAppender, LoggingError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LoggingError::InvalidFilePath(path.display().to_string()))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    std::fs::create_dir_all(&parent)
        .map_err(|e| LoggingError::InvalidFilePath(format!("{}: {e}", parent.display())))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_name)
        .max_log_files(shift_count.saturating_add(1))
        .build(&parent)
        .map_err(|e| LoggingError::InvalidFilePath(format!("{}: {e}", path.display())))
}
