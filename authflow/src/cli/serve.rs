//! serve サブコマンド
//!
//! Webサーバーを起動します。

use crate::common::error::FlowError;
use crate::config::{get_env_with_fallback, AppConfig};
use crate::mail::LogMailer;
use crate::AppState;
use clap::Args;
use std::sync::Arc;

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen port (overrides AUTHFLOW_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address (overrides AUTHFLOW_HOST)
    #[arg(short = 'H', long)]
    pub host: Option<String>,
}

impl ServeArgs {
    /// コマンドライン引数で設定を上書きする
    ///
    /// `AUTHFLOW_BASE_URL`が未設定の場合は、上書き後のアドレスからベースURLを作り直す。
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if (self.host.is_some() || self.port.is_some())
            && get_env_with_fallback("AUTHFLOW_BASE_URL", "BASE_URL").is_none()
        {
            config.base_url = format!("http://{}:{}", config.host, config.port);
        }
    }
}

/// サーバーを起動する
///
/// データベースを初期化し、ロールを投入してからリクエストの受付を開始する。
pub async fn execute(args: &ServeArgs) -> Result<(), FlowError> {
    let mut config = AppConfig::from_env()?;
    args.apply(&mut config);

    tracing::info!(
        "Starting authflow ({} profile, database {})",
        config.profile,
        config.database_url
    );

    let pool = crate::db::migrations::initialize_database(&config.database_url).await?;
    crate::db::roles::insert_roles(&pool).await?;

    let bind_addr = config.bind_addr();
    let state = AppState::new(pool, config, Arc::new(LogMailer))?;
    crate::server::run(state, &bind_addr).await
}
