//! authflow
//!
//! ユーザー登録・ログイン・メールアドレス確認・ログアウトを提供するWebアプリケーション

#![warn(missing_docs)]

/// 共通型定義（エラー、ユーザー、ロール）
pub mod common;

/// Webハンドラー
pub mod api;

/// 認証・認可機能
pub mod auth;

/// CLIインターフェース
pub mod cli;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// データベースアクセス
pub mod db;

/// ロギング初期化ユーティリティ
pub mod logging;

/// メール送信
pub mod mail;

/// HTTPサーバー起動
pub mod server;

/// HTMLテンプレート
pub mod views;

use std::sync::Arc;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// データベース接続プール
    pub db_pool: sqlx::SqlitePool,
    /// アプリケーション設定
    pub config: Arc<config::AppConfig>,
    /// 読み込み済みテンプレート
    pub templates: Arc<views::Templates>,
    /// メール送信手段
    pub mailer: Arc<dyn mail::Mailer>,
}

impl AppState {
    /// テンプレートを読み込んで状態を構築する
    pub fn new(
        db_pool: sqlx::SqlitePool,
        config: config::AppConfig,
        mailer: Arc<dyn mail::Mailer>,
    ) -> Result<Self, common::error::FlowError> {
        Ok(Self {
            db_pool,
            config: Arc::new(config),
            templates: Arc::new(views::Templates::new()?),
            mailer,
        })
    }
}
