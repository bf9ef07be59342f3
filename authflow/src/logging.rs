//! ロギング初期化
//!
//! コンソール出力に加え、`AUTHFLOW_LOG_DIR`が設定されていれば
//! 日次ローテーションのファイルにも出力する。

use crate::common::error::FlowError;
use crate::config::{get_env_with_fallback, get_env_with_fallback_or};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_FILE_PREFIX: &str = "authflow.log";

/// ログフィルタ文字列（`AUTHFLOW_LOG_LEVEL`、なければ`RUST_LOG`）
pub fn log_filter() -> String {
    get_env_with_fallback_or("AUTHFLOW_LOG_LEVEL", "RUST_LOG", DEFAULT_LOG_LEVEL)
}

/// ログファイルの出力先ディレクトリ
pub fn log_dir() -> Option<PathBuf> {
    get_env_with_fallback("AUTHFLOW_LOG_DIR", "LOG_DIR")
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
}

fn env_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// グローバルなtracing subscriberを初期化する
///
/// ファイル出力を有効にした場合は`WorkerGuard`を返す。プロセス終了まで保持すること。
/// すでにsubscriberが設定済みの場合は何もしない。
pub fn init() -> Result<Option<WorkerGuard>, FlowError> {
    let filter = log_filter();
    let console = fmt::layer().with_target(true).with_filter(env_filter(&filter));

    let Some(dir) = log_dir() else {
        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }
        return Ok(None);
    };

    std::fs::create_dir_all(&dir).map_err(|e| {
        FlowError::Config(format!(
            "Failed to create log directory {}: {}",
            dir.display(),
            e
        ))
    })?;
    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(env_filter(&filter));

    if tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already initialized");
    }
    tracing::info!("Writing logs to {}", dir.display());
    Ok(Some(guard))
}
