//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! `FlowError`は`status_code()`と`external_message()`を提供し、
//! Web層はこれを元にHTMLエラーページを生成します。

use axum::http::StatusCode;
use thiserror::Error;

/// authflow error type
#[derive(Debug, Error)]
pub enum FlowError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Password hash error
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// Signed token (session / confirmation / flash) error
    #[error("Token error: {0}")]
    Token(String),

    /// Template rendering error
    #[error("Template error: {0}")]
    Template(String),

    /// Mail delivery error
    #[error("Mail error: {0}")]
    Mail(String),

    /// Validation error (bad request parameters)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FlowError {
    /// Returns a safe error message for external clients.
    ///
    /// The `Display` implementation carries the full details and is meant for
    /// server logs only.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Config(_) => "Internal Server Error",
            Self::Database(_) => "Internal Server Error",
            Self::PasswordHash(_) => "Internal Server Error",
            Self::Token(_) => "Bad Request",
            Self::Template(_) => "Internal Server Error",
            Self::Mail(_) => "Internal Server Error",
            Self::Validation(_) => "Bad Request",
            Self::Authentication(_) => "Unauthorized",
            Self::NotFound(_) => "Page Not Found",
            Self::Internal(_) => "Internal Server Error",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Token(_) => StatusCode::BAD_REQUEST,
            Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Mail(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// サーバー側の障害かどうか（ログ出力レベルの判定に使用）
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<sqlx::Error> for FlowError {
    fn from(err: sqlx::Error) -> Self {
        FlowError::Database(err.to_string())
    }
}

impl From<minijinja::Error> for FlowError {
    fn from(err: minijinja::Error) -> Self {
        FlowError::Template(err.to_string())
    }
}
