// データベース作成とマイグレーション実行

use crate::common::error::FlowError;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};

/// SQLiteデータベース接続プールを作成してマイグレーションを実行
///
/// # Arguments
/// * `database_url` - データベースURL（例: "sqlite:data/authflow.db"）
///
/// # Returns
/// * `Ok(SqlitePool)` - 初期化済みデータベースプール
/// * `Err(FlowError)` - 初期化失敗
pub async fn initialize_database(database_url: &str) -> Result<SqlitePool, FlowError> {
    ensure_parent_dir(database_url)?;

    // データベースファイルが存在しない場合は作成
    if !Sqlite::database_exists(database_url)
        .await
        .map_err(|e| FlowError::Database(format!("Failed to check database: {}", e)))?
    {
        tracing::info!("Creating database: {}", database_url);
        Sqlite::create_database(database_url)
            .await
            .map_err(|e| FlowError::Database(format!("Failed to create database: {}", e)))?;
    }

    let pool = SqlitePool::connect(database_url)
        .await
        .map_err(|e| FlowError::Database(format!("Failed to connect to database: {}", e)))?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// マイグレーションを実行（sqlx::migrate!マクロを使用）
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), FlowError> {
    tracing::info!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| FlowError::Database(format!("Failed to run migrations: {}", e)))?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}

/// 全テーブルを削除してスキーマを作り直す
pub async fn reset_database(pool: &SqlitePool) -> Result<(), FlowError> {
    tracing::warn!("Dropping all tables");

    for table in ["users", "roles", "_sqlx_migrations"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await
            .map_err(|e| FlowError::Database(format!("Failed to drop {}: {}", table, e)))?;
    }

    run_migrations(pool).await
}

/// ファイルベースのURLなら親ディレクトリを作成する
fn ensure_parent_dir(database_url: &str) -> Result<(), FlowError> {
    let Some(path) = database_file_path(database_url) else {
        return Ok(());
    };
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FlowError::Database(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

fn database_file_path(database_url: &str) -> Option<&str> {
    let rest = database_url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.contains(":memory:") {
        None
    } else {
        Some(path)
    }
}
