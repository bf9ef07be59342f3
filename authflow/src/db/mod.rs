//! データベースアクセス層
//!
//! SQLiteベースのデータ永続化

/// ユーザー管理
pub mod users;

/// ロール管理
pub mod roles;

/// データベースマイグレーション
pub mod migrations;
