// 認証ミドルウェア実装

use crate::api::error::AppError;
use crate::common::auth::User;
use crate::common::error::FlowError;
use crate::views::redirect_with_flash;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// ログインが必要なページで表示するメッセージ
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to access this page.";

/// 未確認ユーザーのリダイレクト先
pub const UNCONFIRMED_PATH: &str = "/auth/unconfirmed";

/// リクエストのカレントユーザー（匿名ならNone）
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

/// ログイン済みであることが保証されたユーザー
///
/// `login_required`を通過したルートでのみ拡張データに格納される。
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// セッションCookieからユーザーを解決する
///
/// Cookieが無い、署名不正、期限切れ、ユーザー削除済みの場合は匿名として扱う。
async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<Option<User>, FlowError> {
    let Some(token) = crate::auth::read_cookie(headers, crate::auth::SESSION_COOKIE) else {
        return Ok(None);
    };

    let claims = match crate::auth::session::verify_session_token(&token, &state.config.secret_key)
    {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Ignoring session cookie: {}", e);
            return Ok(None);
        }
    };
    let Ok(user_id) = crate::auth::session::session_user_id(&claims) else {
        return Ok(None);
    };

    crate::db::users::find_by_id(&state.db_pool, user_id).await
}

/// 未確認ユーザーでもアクセスできるパスか
fn is_open_to_unconfirmed(path: &str) -> bool {
    path.starts_with("/auth/") || path.starts_with("/static/")
}

/// カレントユーザー解決ミドルウェア
///
/// 全リクエストに適用する。ログイン中のユーザーは最終アクセス日時を更新し、
/// 未確認の場合は`/auth/`以外へのアクセスを`/auth/unconfirmed`へリダイレクトする。
pub async fn load_current_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match resolve_user(&state, request.headers()).await {
        Ok(user) => user,
        Err(e) => return AppError(e).into_response(),
    };

    if let Some(user) = &user {
        if let Err(e) = crate::db::users::ping(&state.db_pool, user.id).await {
            tracing::warn!("Failed to update last seen for {}: {}", user.id, e);
        }

        if !user.confirmed && !is_open_to_unconfirmed(request.uri().path()) {
            tracing::debug!(
                "Redirecting unconfirmed user {} away from {}",
                user.username,
                request.uri().path()
            );
            return crate::views::redirect(UNCONFIRMED_PATH);
        }
    }

    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

/// ログイン必須ミドルウェア
///
/// `load_current_user`の内側で`route_layer`として適用する。匿名ユーザーは
/// `/auth/login?next=<元のパス>`へリダイレクトする。
pub async fn login_required(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .and_then(|current| current.0.clone());

    match user {
        Some(user) => {
            request.extensions_mut().insert(AuthenticatedUser(user));
            next.run(request).await
        }
        None => {
            let original = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| request.uri().path().to_string());
            let location = login_url(&original);
            redirect_with_flash(&state, request.headers(), &location, LOGIN_REQUIRED_MESSAGE)
                .unwrap_or_else(|e| AppError(e).into_response())
        }
    }
}

/// ログインページのURL（`next`付き）
pub fn login_url(next: &str) -> String {
    match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) => format!("/auth/login?{}", query),
        Err(_) => "/auth/login".to_string(),
    }
}

/// ログイン後のリダイレクト先として安全か（同一サイト内の絶対パスのみ許可）
///
/// ブラウザはURL中のタブや改行を除去するため、制御文字を含むものも拒否する。
pub fn is_safe_next(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(|c| c.is_ascii_control())
}
