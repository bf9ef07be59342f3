// フォーム用CSRFトークン（ダブルサブミット方式）
//
// フォームを表示するGETでCookieを発行し、同じ値をhiddenフィールドに埋め込む。
// POSTではフィールドとCookieが一致することを要求する。

use super::{build_cookie, read_cookie, CSRF_COOKIE};
use axum::http::HeaderMap;

/// CSRFトークン長
const CSRF_TOKEN_LENGTH: usize = 32;

/// フォーム描画用のトークンを取得
///
/// 既存のCookieがあればそれを使い、無ければ新規生成してSet-Cookie値も返す。
pub fn token_for_form(headers: &HeaderMap, secure: bool) -> (String, Option<String>) {
    match read_cookie(headers, CSRF_COOKIE) {
        Some(existing) => (existing, None),
        None => {
            let token = super::generate_random_token(CSRF_TOKEN_LENGTH);
            let cookie = build_cookie(CSRF_COOKIE, &token, None, false, secure);
            (token, Some(cookie))
        }
    }
}

/// 送信されたフィールド値がCookieと一致するか
pub fn verify(headers: &HeaderMap, submitted: Option<&str>) -> bool {
    match (read_cookie(headers, CSRF_COOKIE), submitted) {
        (Some(cookie), Some(field)) => !field.is_empty() && cookie == field,
        _ => false,
    }
}
