//! HTMLテンプレート（minijinja）
//!
//! テンプレートはバイナリに埋め込み、起動時に一度だけ読み込む。
//! `.html`は自動エスケープ、`.txt`（メール本文）はエスケープしない。

use crate::common::auth::User;
use crate::common::error::FlowError;
use crate::AppState;
use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use minijinja::Environment;
use serde::Serialize;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("auth/login.html", include_str!("../templates/auth/login.html")),
    (
        "auth/register.html",
        include_str!("../templates/auth/register.html"),
    ),
    (
        "auth/unconfirmed.html",
        include_str!("../templates/auth/unconfirmed.html"),
    ),
    (
        "auth/email/confirm.txt",
        include_str!("../templates/auth/email/confirm.txt"),
    ),
];

/// 読み込み済みテンプレート
#[derive(Debug)]
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// 埋め込みテンプレートをすべて登録する
    pub fn new() -> Result<Self, FlowError> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// テンプレートを描画
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, FlowError> {
        let template = self.env.get_template(name)?;
        Ok(template.render(ctx)?)
    }
}

/// テンプレートに渡すログインユーザー情報
#[derive(Debug, Serialize)]
pub struct PageUser<'a> {
    /// ユーザー名
    pub username: &'a str,
    /// メール確認済みか
    pub confirmed: bool,
    /// 管理者か
    pub is_administrator: bool,
}

impl<'a> From<&'a User> for PageUser<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            username: &user.username,
            confirmed: user.confirmed,
            is_administrator: user.is_administrator(),
        }
    }
}

#[derive(Serialize)]
struct PageContext<'a, T: Serialize> {
    app_name: &'a str,
    current_user: Option<PageUser<'a>>,
    flashes: &'a [String],
    #[serde(flatten)]
    page: T,
}

/// 共通レイアウト付きでページを描画する
///
/// 未読のフラッシュメッセージを表示し、その場合はフラッシュCookieを消去する。
pub fn render_page<T: Serialize>(
    state: &AppState,
    headers: &HeaderMap,
    user: Option<&User>,
    template: &str,
    page: T,
) -> Result<Response, FlowError> {
    render_page_with_status(state, headers, user, StatusCode::OK, template, page)
}

/// ステータスコードを指定してページを描画する
pub fn render_page_with_status<T: Serialize>(
    state: &AppState,
    headers: &HeaderMap,
    user: Option<&User>,
    status: StatusCode,
    template: &str,
    page: T,
) -> Result<Response, FlowError> {
    render(state, headers, user, status, template, page, None)
}

/// このレスポンス自身にフラッシュメッセージを追加して描画する
///
/// フォームを再表示する場合など、リダイレクトを挟まずにメッセージを出すときに使う。
pub fn render_page_with_flash<T: Serialize>(
    state: &AppState,
    headers: &HeaderMap,
    user: Option<&User>,
    template: &str,
    page: T,
    message: &str,
) -> Result<Response, FlowError> {
    render(state, headers, user, StatusCode::OK, template, page, Some(message))
}

fn render<T: Serialize>(
    state: &AppState,
    headers: &HeaderMap,
    user: Option<&User>,
    status: StatusCode,
    template: &str,
    page: T,
    pending: Option<&str>,
) -> Result<Response, FlowError> {
    let queued = crate::auth::flash::read_flashes(headers, &state.config.secret_key);
    let mut flashes = queued.clone();
    flashes.extend(pending.map(str::to_string));

    let body = state.templates.render(
        template,
        PageContext {
            app_name: &state.config.app_name,
            current_user: user.map(PageUser::from),
            flashes: &flashes,
            page,
        },
    )?;

    let mut response = (status, Html(body)).into_response();
    if !queued.is_empty() {
        let secure = crate::auth::is_request_secure(headers);
        append_cookie(&mut response, &crate::auth::flash::clear_flash_cookie(secure))?;
    }
    Ok(response)
}

/// 302 Foundでリダイレクトする
pub fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => (StatusCode::FOUND, [(header::LOCATION, HeaderValue::from_static("/"))])
            .into_response(),
    }
}

/// フラッシュメッセージを積んでリダイレクトする
pub fn redirect_with_flash(
    state: &AppState,
    headers: &HeaderMap,
    location: &str,
    message: &str,
) -> Result<Response, FlowError> {
    let secure = crate::auth::is_request_secure(headers);
    let cookie = crate::auth::flash::push_flash(headers, &state.config.secret_key, message, secure)?;
    let mut response = redirect(location);
    append_cookie(&mut response, &cookie)?;
    Ok(response)
}

/// レスポンスにSet-Cookieヘッダーを追加する
pub fn append_cookie(response: &mut Response, cookie: &str) -> Result<(), FlowError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| FlowError::Internal(format!("Invalid Set-Cookie value: {}", e)))?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(())
}
