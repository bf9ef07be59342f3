// 認証モジュール

/// パスワードハッシュ化・検証（bcrypt）
pub mod password;

/// セッションJWT生成・検証（jsonwebtoken）
pub mod session;

/// メールアドレス確認トークン
pub mod confirmation;

/// フラッシュメッセージ（署名付きCookie）
pub mod flash;

/// フォーム用CSRFトークン
pub mod csrf;

/// 認証ミドルウェア（カレントユーザー解決、未確認ユーザーのゲート）
pub mod middleware;

use crate::common::error::FlowError;
use axum::http::{header, HeaderMap};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Serialize};

/// セッションCookie名
pub const SESSION_COOKIE: &str = "authflow_session";
/// フラッシュメッセージCookie名
pub const FLASH_COOKIE: &str = "authflow_flash";
/// CSRF Cookie名
pub const CSRF_COOKIE: &str = "authflow_csrf";

/// Set-Cookieヘッダー値を生成
///
/// `max_age_secs`がNoneの場合はブラウザセッション限りのCookieになる。
pub fn build_cookie(
    name: &str,
    value: &str,
    max_age_secs: Option<u64>,
    http_only: bool,
    secure: bool,
) -> String {
    let mut cookie = format!("{}={}; Path=/", name, value);
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    cookie.push_str("; SameSite=Lax");
    if let Some(max_age) = max_age_secs {
        cookie.push_str(&format!("; Max-Age={}", max_age));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Cookieを削除するためのヘッダー値を生成
pub fn clear_cookie(name: &str, http_only: bool, secure: bool) -> String {
    let mut cookie = format!("{}=; Path=/", name);
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    cookie.push_str("; SameSite=Lax; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// リクエストのCookieヘッダーから指定名の値を取り出す
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(cookie_header) = value.to_str() else {
            continue;
        };
        for part in cookie_header.split(';') {
            if let Some((key, val)) = part.trim().split_once('=') {
                if key == name && !val.is_empty() {
                    return Some(val.to_string());
                }
            }
        }
    }
    None
}

/// リクエストがHTTPS経由か（リバースプロキシのヘッダーを考慮）
pub fn is_request_secure(headers: &HeaderMap) -> bool {
    if let Some(proto) = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
    {
        if proto.eq_ignore_ascii_case("https") {
            return true;
        }
    }
    if let Some(forwarded) = headers
        .get("forwarded")
        .and_then(|value| value.to_str().ok())
    {
        let lowered = forwarded.to_ascii_lowercase();
        if lowered.contains("proto=https") {
            return true;
        }
    }
    false
}

/// 現在時刻から`ttl_secs`秒後のUNIXタイムスタンプ（負値で過去）
pub(crate) fn expiration_after(ttl_secs: i64) -> Result<usize, FlowError> {
    let expires_at = chrono::Duration::try_seconds(ttl_secs)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| FlowError::Config(format!("Token lifetime out of range: {}s", ttl_secs)))?;
    Ok(expires_at.timestamp().max(0) as usize)
}

/// 設定の有効期間をトークン用の秒数に変換する
pub fn ttl_secs(ttl: std::time::Duration) -> Result<i64, FlowError> {
    i64::try_from(ttl.as_secs())
        .map_err(|_| FlowError::Config(format!("Token lifetime out of range: {:?}", ttl)))
}

/// クレームをHS256で署名する
pub(crate) fn sign_claims<T: Serialize>(claims: &T, secret: &str) -> Result<String, FlowError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| FlowError::Token(format!("Failed to sign token: {}", e)))
}

/// 署名と有効期限を検証してクレームを取り出す
pub(crate) fn verify_claims<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, FlowError> {
    decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| FlowError::Token(format!("Failed to verify token: {}", e)))
}

/// ランダムトークン生成
pub fn generate_random_token(length: usize) -> String {
    use rand::RngExt;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
