// ロールの投入と検索

use crate::common::auth::{Permission, Role};
use crate::common::error::FlowError;
use sqlx::SqlitePool;

/// 標準ロールの定義（名前、権限、デフォルトか）
const ROLE_DEFINITIONS: &[(&str, &[Permission], bool)] = &[
    (
        "User",
        &[Permission::Follow, Permission::Comment, Permission::Write],
        true,
    ),
    (
        "Moderator",
        &[
            Permission::Follow,
            Permission::Comment,
            Permission::Write,
            Permission::Moderate,
        ],
        false,
    ),
    (
        "Administrator",
        &[
            Permission::Follow,
            Permission::Comment,
            Permission::Write,
            Permission::Moderate,
            Permission::Admin,
        ],
        false,
    ),
];

/// 管理者ロール名
pub const ADMINISTRATOR: &str = "Administrator";

/// 標準ロールを投入する
///
/// 何度実行しても同じ結果になる。既存ロールの権限とデフォルト指定は定義に合わせて更新される。
///
/// # Returns
/// * `Ok(Vec<Role>)` - 投入後の全ロール
/// * `Err(FlowError)` - 投入失敗
pub async fn insert_roles(pool: &SqlitePool) -> Result<Vec<Role>, FlowError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| FlowError::Database(format!("Failed to begin transaction: {}", e)))?;

    for (name, permissions, is_default) in ROLE_DEFINITIONS {
        sqlx::query(
            "INSERT INTO roles (name, is_default, permissions) VALUES (?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET
                 is_default = excluded.is_default,
                 permissions = excluded.permissions",
        )
        .bind(*name)
        .bind(*is_default as i32)
        .bind(Permission::combine(permissions))
        .execute(&mut *tx)
        .await
        .map_err(|e| FlowError::Database(format!("Failed to insert role {}: {}", name, e)))?;
    }

    tx.commit()
        .await
        .map_err(|e| FlowError::Database(format!("Failed to commit roles: {}", e)))?;

    let roles = list(pool).await?;
    tracing::info!("Seeded {} roles", roles.len());
    Ok(roles)
}

/// すべてのロールを取得
pub async fn list(pool: &SqlitePool) -> Result<Vec<Role>, FlowError> {
    let rows = sqlx::query_as::<_, RoleRow>(
        "SELECT id, name, is_default, permissions FROM roles ORDER BY permissions ASC",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| FlowError::Database(format!("Failed to list roles: {}", e)))?;

    Ok(rows.into_iter().map(RoleRow::into_role).collect())
}

/// 名前でロールを検索
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Role>, FlowError> {
    let row = sqlx::query_as::<_, RoleRow>(
        "SELECT id, name, is_default, permissions FROM roles WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .map_err(|e| FlowError::Database(format!("Failed to find role: {}", e)))?;

    Ok(row.map(RoleRow::into_role))
}

/// デフォルトロールを取得（未投入ならNone）
pub async fn find_default(pool: &SqlitePool) -> Result<Option<Role>, FlowError> {
    let row = sqlx::query_as::<_, RoleRow>(
        "SELECT id, name, is_default, permissions FROM roles WHERE is_default = 1 LIMIT 1",
    )
    .fetch_optional(pool)
    .await
    .map_err(|e| FlowError::Database(format!("Failed to find default role: {}", e)))?;

    Ok(row.map(RoleRow::into_role))
}

/// 新規登録ユーザーに割り当てるロールを決定
///
/// 管理者メールアドレスと一致すれば管理者ロール、それ以外はデフォルトロール。
pub async fn role_for_new_user(
    pool: &SqlitePool,
    email: &str,
    admin_email: Option<&str>,
) -> Result<Option<Role>, FlowError> {
    if admin_email.is_some_and(|admin| admin.eq_ignore_ascii_case(email)) {
        if let Some(role) = find_by_name(pool, ADMINISTRATOR).await? {
            return Ok(Some(role));
        }
    }
    find_default(pool).await
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    id: i64,
    name: String,
    is_default: i32,
    permissions: i64,
}

impl RoleRow {
    fn into_role(self) -> Role {
        Role {
            id: self.id,
            name: self.name,
            is_default: self.is_default != 0,
            permissions: self.permissions,
        }
    }
}
