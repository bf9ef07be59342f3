// ユーザーCRUD操作

use crate::common::auth::{Role, User};
use crate::common::error::FlowError;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

const SELECT_USER: &str = "SELECT u.id, u.email, u.username, u.password_hash, u.confirmed,
        u.member_since, u.last_seen,
        r.id AS role_id, r.name AS role_name, r.is_default AS role_is_default,
        r.permissions AS role_permissions
     FROM users u LEFT JOIN roles r ON r.id = u.role_id";

/// ユーザーを作成（未確認状態）
///
/// # Arguments
/// * `pool` - データベース接続プール
/// * `email` - メールアドレス（小文字に正規化して保存）
/// * `username` - ユーザー名
/// * `password_hash` - bcryptハッシュ化されたパスワード
/// * `role_id` - 割り当てるロール
///
/// # Returns
/// * `Ok(User)` - 作成されたユーザー
/// * `Err(FlowError)` - 作成失敗（メールアドレス・ユーザー名重複など）
pub async fn create(
    pool: &SqlitePool,
    email: &str,
    username: &str,
    password_hash: &str,
    role_id: Option<i64>,
) -> Result<User, FlowError> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let email = email.trim().to_lowercase();

    sqlx::query(
        "INSERT INTO users (id, email, username, password_hash, role_id, confirmed, member_since, last_seen)
         VALUES (?, ?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(id.to_string())
    .bind(&email)
    .bind(username)
    .bind(password_hash)
    .bind(role_id)
    .bind(now.to_rfc3339())
    .bind(now.to_rfc3339())
    .execute(pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            FlowError::Validation(format!(
                "Email '{}' or username '{}' already exists",
                email, username
            ))
        } else {
            FlowError::Database(format!("Failed to create user: {}", e))
        }
    })?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| FlowError::Database(format!("User vanished after insert: {}", id)))
}

/// IDでユーザーを検索
pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, FlowError> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.id = ?", SELECT_USER))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
        .map_err(|e| FlowError::Database(format!("Failed to find user: {}", e)))?;

    row.map(UserRow::try_into_user).transpose()
}

/// メールアドレスでユーザーを検索（大文字小文字を区別しない）
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, FlowError> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.email = ?", SELECT_USER))
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await
        .map_err(|e| FlowError::Database(format!("Failed to find user: {}", e)))?;

    row.map(UserRow::try_into_user).transpose()
}

/// ユーザー名でユーザーを検索
pub async fn find_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, FlowError> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.username = ?", SELECT_USER))
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(|e| FlowError::Database(format!("Failed to find user: {}", e)))?;

    row.map(UserRow::try_into_user).transpose()
}

/// ユーザーを確認済みにする
///
/// # Returns
/// * `Ok(true)` - 今回の呼び出しで未確認から確認済みに遷移した
/// * `Ok(false)` - すでに確認済み、またはユーザーが存在しない
pub async fn mark_confirmed(pool: &SqlitePool, id: Uuid) -> Result<bool, FlowError> {
    let result = sqlx::query("UPDATE users SET confirmed = 1 WHERE id = ? AND confirmed = 0")
        .bind(id.to_string())
        .execute(pool)
        .await
        .map_err(|e| FlowError::Database(format!("Failed to confirm user: {}", e)))?;

    Ok(result.rows_affected() == 1)
}

/// 最終アクセス日時を更新
pub async fn ping(pool: &SqlitePool, id: Uuid) -> Result<(), FlowError> {
    sqlx::query("UPDATE users SET last_seen = ? WHERE id = ?")
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(pool)
        .await
        .map_err(|e| FlowError::Database(format!("Failed to update last seen: {}", e)))?;

    Ok(())
}

/// ユーザー数を取得
pub async fn count(pool: &SqlitePool) -> Result<i64, FlowError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .map_err(|e| FlowError::Database(format!("Failed to count users: {}", e)))
}

// SQLiteからの行取得用の内部型
#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    username: String,
    password_hash: String,
    confirmed: i32,
    member_since: String,
    last_seen: String,
    role_id: Option<i64>,
    role_name: Option<String>,
    role_is_default: Option<i32>,
    role_permissions: Option<i64>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, FlowError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| FlowError::Database(format!("Invalid user id '{}': {}", self.id, e)))?;
        let role = match (self.role_id, self.role_name) {
            (Some(role_id), Some(name)) => Some(Role {
                id: role_id,
                name,
                is_default: self.role_is_default.unwrap_or(0) != 0,
                permissions: self.role_permissions.unwrap_or(0),
            }),
            _ => None,
        };

        Ok(User {
            id,
            email: self.email,
            username: self.username,
            password_hash: self.password_hash,
            role,
            confirmed: self.confirmed != 0,
            member_since: parse_timestamp(&self.member_since)?,
            last_seen: parse_timestamp(&self.last_seen)?,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, FlowError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| FlowError::Database(format!("Invalid timestamp '{}': {}", raw, e)))
}
