//! 統合テスト用の共通ユーティリティ

pub mod client;
pub mod flows;
