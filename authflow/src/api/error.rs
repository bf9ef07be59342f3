//! HTMLエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use crate::common::error::FlowError;
use axum::response::{Html, IntoResponse, Response};

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub FlowError);

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // 詳細はログにのみ出力し、レスポンスにはexternal_message()だけを含める
        if self.0.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }

        let status = self.0.status_code();
        let message = self.0.external_message();
        (status, Html(error_page(status.as_u16(), message))).into_response()
    }
}

/// テンプレートに依存しない最小限のエラーページ
fn error_page(code: u16, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{code} {message}</title></head>\n<body>\n<h1>{message}</h1>\n</body>\n</html>\n"
    )
}
