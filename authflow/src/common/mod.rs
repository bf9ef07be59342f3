//! 共通型定義

/// 認証関連のデータモデル
pub mod auth;

/// 統一エラー型
pub mod error;
