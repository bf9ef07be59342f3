//! deploy サブコマンド
//!
//! データベースを作成し、マイグレーションとロール投入を行います。

use crate::common::auth::Role;
use crate::common::error::FlowError;
use crate::config::AppConfig;
use clap::Args;

/// deploy サブコマンドの引数
#[derive(Args, Debug, Clone, Default)]
pub struct DeployArgs {
    /// Drop all tables before migrating (destroys existing accounts)
    #[arg(long, default_value_t = false)]
    pub reset: bool,
}

/// 設定されたデータベースを準備する
pub async fn execute(args: &DeployArgs) -> Result<Vec<Role>, FlowError> {
    let config = AppConfig::from_env()?;
    deploy(&config.database_url, args.reset).await
}

/// データベースURLを指定して準備する
pub async fn deploy(database_url: &str, reset: bool) -> Result<Vec<Role>, FlowError> {
    let pool = crate::db::migrations::initialize_database(database_url).await?;
    if reset {
        crate::db::migrations::reset_database(&pool).await?;
    }
    let roles = crate::db::roles::insert_roles(&pool).await?;
    pool.close().await;

    tracing::info!("Deployed database {}", database_url);
    Ok(roles)
}
