// セッションJWTの生成と検証
//
// セッションはサーバー側に状態を持たない署名付きトークンで、
// `authflow_session` Cookieに格納される。

use super::{
    build_cookie, clear_cookie, expiration_after, sign_claims, verify_claims, SESSION_COOKIE,
};
use crate::common::auth::SessionClaims;
use crate::common::error::FlowError;
use uuid::Uuid;

/// セッショントークンを生成
///
/// # Arguments
/// * `user_id` - ログインしたユーザーID
/// * `secret` - 署名鍵
/// * `ttl_secs` - 有効期間（秒）
/// * `remember` - ブラウザ終了後もログインを保持するか
///
/// # Returns
/// * `Ok(String)` - JWTトークン
/// * `Err(FlowError)` - 生成失敗
pub fn create_session_token(
    user_id: Uuid,
    secret: &str,
    ttl_secs: i64,
    remember: bool,
) -> Result<String, FlowError> {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        exp: expiration_after(ttl_secs)?,
        remember,
    };
    sign_claims(&claims, secret)
}

/// セッショントークンを検証
///
/// # Returns
/// * `Ok(SessionClaims)` - 検証済みクレーム
/// * `Err(FlowError)` - 署名不一致、期限切れ、別用途のトークンなど
pub fn verify_session_token(token: &str, secret: &str) -> Result<SessionClaims, FlowError> {
    verify_claims::<SessionClaims>(token, secret)
}

/// セッショントークンからユーザーIDを取り出す
pub fn session_user_id(claims: &SessionClaims) -> Result<Uuid, FlowError> {
    claims
        .sub
        .parse::<Uuid>()
        .map_err(|e| FlowError::Token(format!("Invalid session subject: {}", e)))
}

/// セッションCookieを生成
///
/// remember meの場合のみMax-Ageを付与し、それ以外はブラウザセッション限りとする。
pub fn build_session_cookie(token: &str, remember_max_age: Option<u64>, secure: bool) -> String {
    build_cookie(SESSION_COOKIE, token, remember_max_age, true, secure)
}

/// セッションCookieを削除するためのヘッダーを生成
pub fn clear_session_cookie(secure: bool) -> String {
    clear_cookie(SESSION_COOKIE, true, secure)
}
