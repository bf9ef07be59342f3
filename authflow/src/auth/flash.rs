// フラッシュメッセージ
//
// リダイレクト時にメッセージを署名付きCookieへ積み、次に描画されるページで取り出して消去する。

use super::{
    build_cookie, clear_cookie, expiration_after, read_cookie, sign_claims, verify_claims,
    FLASH_COOKIE,
};
use crate::common::auth::FlashClaims;
use crate::common::error::FlowError;
use axum::http::HeaderMap;

/// 未読メッセージを保持する期間（秒）
const FLASH_TTL_SECS: i64 = 300;

/// リクエストのCookieから未読メッセージを取り出す
///
/// Cookieが無い、署名が不正、期限切れの場合は空。
pub fn read_flashes(headers: &HeaderMap, secret: &str) -> Vec<String> {
    read_cookie(headers, FLASH_COOKIE)
        .and_then(|token| verify_claims::<FlashClaims>(&token, secret).ok())
        .map(|claims| claims.flashes)
        .unwrap_or_default()
}

/// メッセージを積んだSet-Cookie値を生成
///
/// 未読メッセージが残っている場合はその後ろに追加する。
pub fn push_flash(
    headers: &HeaderMap,
    secret: &str,
    message: &str,
    secure: bool,
) -> Result<String, FlowError> {
    let mut flashes = read_flashes(headers, secret);
    flashes.push(message.to_string());
    let claims = FlashClaims {
        flashes,
        exp: expiration_after(FLASH_TTL_SECS)?,
    };
    let token = sign_claims(&claims, secret)?;
    Ok(build_cookie(FLASH_COOKIE, &token, None, true, secure))
}

/// 表示済みメッセージを消去するSet-Cookie値
pub fn clear_flash_cookie(secure: bool) -> String {
    clear_cookie(FLASH_COOKIE, true, secure)
}
