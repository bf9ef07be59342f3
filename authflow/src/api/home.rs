// トップページと404ページ

use super::error::AppError;
use crate::auth::middleware::CurrentUser;
use crate::views::{render_page, render_page_with_status};
use crate::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
    Extension,
};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorPage {
    title: &'static str,
    message: &'static str,
}

/// GET /
pub async fn index(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    Ok(render_page(&state, &headers, current.as_ref(), "index.html", ())?)
}

/// 未定義のパス
pub async fn not_found(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    Ok(render_page_with_status(
        &state,
        &headers,
        current.as_ref(),
        StatusCode::NOT_FOUND,
        "error.html",
        ErrorPage {
            title: "Page Not Found",
            message: "The page you requested does not exist.",
        },
    )?)
}
