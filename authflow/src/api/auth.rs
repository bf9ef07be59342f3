// 認証フロー（登録・ログイン・確認・ログアウト）のハンドラー

use super::error::AppError;
use super::forms::{FieldErrors, LoginForm, RegisterForm};
use crate::auth::confirmation::{self, ConfirmOutcome};
use crate::auth::middleware::{is_safe_next, AuthenticatedUser, CurrentUser};
use crate::auth::{csrf, is_request_secure, password, session, ttl_secs};
use crate::common::auth::User;
use crate::common::error::FlowError;
use crate::views::{append_cookie, redirect, redirect_with_flash, render_page, render_page_with_flash};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
    Extension, Form,
};
use serde::{Deserialize, Serialize};

const REGISTERED_MESSAGE: &str = "A confirmation email has been sent to you by email.";
const RESENT_MESSAGE: &str = "A new confirmation email has been sent to you by email.";
const INVALID_LOGIN_MESSAGE: &str = "Invalid email or password.";
const CONFIRMED_MESSAGE: &str = "You have confirmed your account. Thanks!";
const INVALID_LINK_MESSAGE: &str = "The confirmation link is invalid or has expired.";
const LOGGED_OUT_MESSAGE: &str = "You have been logged out.";

/// ログイン後のリダイレクト先
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    /// 元のページのパス
    pub next: Option<String>,
}

#[derive(Serialize)]
struct LoginPage<'a> {
    action: String,
    form: &'a LoginForm,
    errors: &'a FieldErrors,
    csrf_token: Option<String>,
}

#[derive(Serialize)]
struct RegisterPage<'a> {
    form: &'a RegisterForm,
    errors: &'a FieldErrors,
    csrf_token: Option<String>,
}

/// フォーム描画用のCSRFトークンと、新規発行時のSet-Cookie値
fn form_csrf(state: &AppState, headers: &HeaderMap) -> (Option<String>, Option<String>) {
    if !state.config.csrf_enabled {
        return (None, None);
    }
    let (token, cookie) = csrf::token_for_form(headers, is_request_secure(headers));
    (Some(token), cookie)
}

/// POSTされたフォームのCSRFトークンを検証
fn check_csrf(
    state: &AppState,
    headers: &HeaderMap,
    submitted: Option<&str>,
) -> Result<(), FlowError> {
    if state.config.csrf_enabled && !csrf::verify(headers, submitted) {
        tracing::warn!("Rejected form submission with missing or invalid CSRF token");
        return Err(FlowError::Validation(
            "The CSRF token is missing or invalid".to_string(),
        ));
    }
    Ok(())
}

fn login_action(next: Option<&str>) -> String {
    match next.filter(|next| is_safe_next(next)) {
        Some(next) => crate::auth::middleware::login_url(next),
        None => "/auth/login".to_string(),
    }
}

fn render_login(
    state: &AppState,
    headers: &HeaderMap,
    current: Option<&User>,
    next: Option<&str>,
    form: &LoginForm,
    errors: &FieldErrors,
    flash: Option<&str>,
) -> Result<Response, FlowError> {
    let (csrf_token, csrf_cookie) = form_csrf(state, headers);
    let page = LoginPage {
        action: login_action(next),
        form,
        errors,
        csrf_token,
    };
    let mut response = match flash {
        Some(message) => {
            render_page_with_flash(state, headers, current, "auth/login.html", page, message)?
        }
        None => render_page(state, headers, current, "auth/login.html", page)?,
    };
    if let Some(cookie) = csrf_cookie {
        append_cookie(&mut response, &cookie)?;
    }
    Ok(response)
}

fn render_register(
    state: &AppState,
    headers: &HeaderMap,
    current: Option<&User>,
    form: &RegisterForm,
    errors: &FieldErrors,
) -> Result<Response, FlowError> {
    let (csrf_token, csrf_cookie) = form_csrf(state, headers);
    let page = RegisterPage {
        form,
        errors,
        csrf_token,
    };
    let mut response = render_page(state, headers, current, "auth/register.html", page)?;
    if let Some(cookie) = csrf_cookie {
        append_cookie(&mut response, &cookie)?;
    }
    Ok(response)
}

/// 確認メールを送信する（失敗してもリクエストは失敗させない）
async fn send_confirmation(state: &AppState, user: &User) -> Result<(), FlowError> {
    let token = confirmation::generate_confirmation_token(
        user.id,
        &state.config.secret_key,
        ttl_secs(state.config.confirmation_ttl)?,
    )?;
    let email =
        crate::mail::confirmation_email(&state.config, &state.templates, user, &token)?;
    if let Err(e) = state.mailer.send(email).await {
        tracing::error!("Failed to send confirmation email to {}: {}", user.email, e);
    }
    Ok(())
}

/// GET /auth/login
pub async fn login_page(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Query(query): Query<NextQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    Ok(render_login(
        &state,
        &headers,
        current.as_ref(),
        query.next.as_deref(),
        &LoginForm::default(),
        &FieldErrors::new(),
        None,
    )?)
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Query(query): Query<NextQuery>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    check_csrf(&state, &headers, form.csrf_token.as_deref())?;
    let next = query.next.as_deref();

    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(render_login(
            &state,
            &headers,
            current.as_ref(),
            next,
            &form,
            &errors,
            None,
        )?);
    }

    // ユーザーを検索してパスワードを検証
    let user = crate::db::users::find_by_email(&state.db_pool, &form.email).await?;
    let verified = match &user {
        Some(user) => password::verify_password(&form.password, &user.password_hash)?,
        None => false,
    };
    let Some(user) = user.filter(|_| verified) else {
        tracing::info!("Rejected login for {}", form.email.trim().to_lowercase());
        return Ok(render_login(
            &state,
            &headers,
            current.as_ref(),
            next,
            &form,
            &FieldErrors::new(),
            Some(INVALID_LOGIN_MESSAGE),
        )?);
    };

    let remember = form.remember();
    let ttl = if remember {
        state.config.remember_ttl
    } else {
        state.config.session_ttl
    };
    let token = session::create_session_token(
        user.id,
        &state.config.secret_key,
        ttl_secs(ttl)?,
        remember,
    )?;
    let cookie = session::build_session_cookie(
        &token,
        remember.then(|| state.config.remember_ttl.as_secs()),
        is_request_secure(&headers),
    );

    tracing::info!("User logged in: {} (remember={})", user.username, remember);

    let location = next.filter(|next| is_safe_next(next)).unwrap_or("/");
    let mut response = redirect(location);
    append_cookie(&mut response, &cookie)?;
    Ok(response)
}

/// GET /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let mut response = redirect_with_flash(&state, &headers, "/", LOGGED_OUT_MESSAGE)?;
    append_cookie(
        &mut response,
        &session::clear_session_cookie(is_request_secure(&headers)),
    )?;

    tracing::info!("User logged out: {}", user.username);
    Ok(response)
}

/// GET /auth/register
pub async fn register_page(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    Ok(render_register(
        &state,
        &headers,
        current.as_ref(),
        &RegisterForm::default(),
        &FieldErrors::new(),
    )?)
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    check_csrf(&state, &headers, form.csrf_token.as_deref())?;

    let errors = form.validate(&state.db_pool).await?;
    if !errors.is_empty() {
        return Ok(render_register(
            &state,
            &headers,
            current.as_ref(),
            &form,
            &errors,
        )?);
    }

    let password_hash = password::hash_password(&form.password, state.config.bcrypt_cost)?;
    let role = crate::db::roles::role_for_new_user(
        &state.db_pool,
        form.email.trim(),
        state.config.admin_email.as_deref(),
    )
    .await?;
    let user = crate::db::users::create(
        &state.db_pool,
        &form.email,
        form.username.trim(),
        &password_hash,
        role.as_ref().map(|role| role.id),
    )
    .await?;

    tracing::info!(
        "User registered: {} (role={})",
        user.username,
        role.as_ref().map(|role| role.name.as_str()).unwrap_or("none")
    );

    send_confirmation(&state, &user).await?;
    Ok(redirect_with_flash(
        &state,
        &headers,
        "/auth/login",
        REGISTERED_MESSAGE,
    )?)
}

/// GET /auth/confirm/{token}
pub async fn confirm(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let outcome =
        confirmation::confirm_user(&state.db_pool, &user, &token, &state.config.secret_key)
            .await?;

    match outcome {
        ConfirmOutcome::AlreadyConfirmed => Ok(redirect("/")),
        ConfirmOutcome::Confirmed => {
            tracing::info!("User confirmed: {}", user.username);
            Ok(redirect_with_flash(&state, &headers, "/", CONFIRMED_MESSAGE)?)
        }
        ConfirmOutcome::Invalid => Ok(redirect_with_flash(
            &state,
            &headers,
            "/",
            INVALID_LINK_MESSAGE,
        )?),
    }
}

/// GET /auth/confirm
pub async fn resend_confirmation(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    send_confirmation(&state, &user).await?;
    tracing::info!("Confirmation email re-sent: {}", user.username);
    Ok(redirect_with_flash(&state, &headers, "/", RESENT_MESSAGE)?)
}

/// GET /auth/unconfirmed
pub async fn unconfirmed(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    match current {
        Some(user) if !user.confirmed => Ok(render_page(
            &state,
            &headers,
            Some(&user),
            "auth/unconfirmed.html",
            (),
        )?),
        _ => Ok(redirect("/")),
    }
}
