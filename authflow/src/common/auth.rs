// 認証関連のデータモデル

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 権限ビット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// ユーザーのフォロー
    Follow,
    /// コメント投稿
    Comment,
    /// 記事の執筆
    Write,
    /// 他ユーザーのコメントのモデレーション
    Moderate,
    /// 管理者権限
    Admin,
}

impl Permission {
    /// 権限のビット値
    pub const fn bits(self) -> i64 {
        match self {
            Permission::Follow => 1,
            Permission::Comment => 2,
            Permission::Write => 4,
            Permission::Moderate => 8,
            Permission::Admin => 16,
        }
    }

    /// 権限集合をビット値に変換
    pub fn combine(permissions: &[Permission]) -> i64 {
        permissions.iter().fold(0, |acc, p| acc | p.bits())
    }
}

/// ロール
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// ロールID
    pub id: i64,
    /// ロール名（一意）
    pub name: String,
    /// 新規ユーザーに割り当てられるデフォルトロールか
    pub is_default: bool,
    /// 権限ビット
    pub permissions: i64,
}

impl Role {
    /// 指定した権限を持っているか
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions & permission.bits() == permission.bits()
    }
}

/// ユーザー
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// ユーザーID
    pub id: Uuid,
    /// メールアドレス（小文字で保存）
    pub email: String,
    /// ユーザー名
    pub username: String,
    /// パスワードハッシュ（bcrypt）
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// ロール（未シード時はNone）
    pub role: Option<Role>,
    /// メールアドレス確認済みか
    pub confirmed: bool,
    /// 登録日時
    pub member_since: DateTime<Utc>,
    /// 最終アクセス日時
    pub last_seen: DateTime<Utc>,
}

impl User {
    /// ロールが指定した権限を持っているか
    pub fn can(&self, permission: Permission) -> bool {
        self.role
            .as_ref()
            .map(|role| role.has_permission(permission))
            .unwrap_or(false)
    }

    /// 管理者か
    pub fn is_administrator(&self) -> bool {
        self.can(Permission::Admin)
    }
}

/// セッションJWTクレーム
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// ユーザーID（JWT sub claim）
    pub sub: String,
    /// 有効期限（UNIXタイムスタンプ）
    pub exp: usize,
    /// ログイン状態を保持するか（remember me）
    pub remember: bool,
}

/// メール確認トークンのクレーム
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationClaims {
    /// 確認対象のユーザーID
    pub confirm: String,
    /// 有効期限（UNIXタイムスタンプ）
    pub exp: usize,
}

/// フラッシュメッセージCookieのクレーム
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashClaims {
    /// 次のページで表示するメッセージ
    pub flashes: Vec<String>,
    /// 有効期限（UNIXタイムスタンプ）
    pub exp: usize,
}
