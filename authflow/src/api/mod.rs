//! Webハンドラー
//!
//! ルーティングとHTMLフォームの処理

/// 認証フロー
pub mod auth;

/// HTMLエラーレスポンス
pub mod error;

/// フォーム定義とバリデーション
pub mod forms;

/// トップページ
pub mod home;

use crate::auth::middleware::{load_current_user, login_required};
use crate::AppState;
use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

/// アプリケーションのルーターを構築
///
/// カレントユーザー解決は全ルート（404含む）に、ログイン必須チェックは
/// ログアウトと確認系のルートにのみ適用する。
pub fn create_app(state: AppState) -> Router {
    let login_required_routes = Router::new()
        .route("/auth/logout", get(auth::logout))
        .route("/auth/confirm", get(auth::resend_confirmation))
        .route("/auth/confirm/{token}", get(auth::confirm))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login_required,
        ));

    Router::new()
        .route("/", get(home::index))
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route(
            "/auth/register",
            get(auth::register_page).post(auth::register),
        )
        .route("/auth/unconfirmed", get(auth::unconfirmed))
        .merge(login_required_routes)
        .fallback(home::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            load_current_user,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
