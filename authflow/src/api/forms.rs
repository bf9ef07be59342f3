// ログイン・登録フォームとバリデーション

use crate::common::error::FlowError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

/// フィールド名ごとのエラーメッセージ
pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

const MAX_FIELD_LENGTH: usize = 64;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("valid regex"));
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.]*$").expect("valid regex"));

const REQUIRED: &str = "This field is required.";
const INVALID_EMAIL: &str = "Invalid email address.";
const EMAIL_TAKEN: &str = "Email already registered.";
const USERNAME_TAKEN: &str = "Username already in use.";
const USERNAME_CHARSET: &str = "Usernames must have only letters, numbers, dots or underscores";
const PASSWORDS_MUST_MATCH: &str = "Passwords must match.";

/// ログインフォーム
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginForm {
    /// メールアドレス
    pub email: String,
    /// パスワード
    #[serde(skip_serializing)]
    pub password: String,
    /// ログイン状態を保持するか（チェックボックス）
    pub remember_me: Option<String>,
    /// CSRFトークン
    #[serde(skip_serializing)]
    pub csrf_token: Option<String>,
}

impl LoginForm {
    /// remember meチェックボックスがオンか
    pub fn remember(&self) -> bool {
        self.remember_me
            .as_deref()
            .is_some_and(|value| !value.is_empty() && !value.eq_ignore_ascii_case("false"))
    }

    /// 入力形式を検証
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_email_shape(&mut errors, &self.email);
        if self.password.is_empty() {
            push(&mut errors, "password", REQUIRED);
        }
        errors
    }
}

/// 登録フォーム
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegisterForm {
    /// メールアドレス
    pub email: String,
    /// ユーザー名
    pub username: String,
    /// パスワード
    #[serde(skip_serializing)]
    pub password: String,
    /// パスワード（確認）
    #[serde(skip_serializing)]
    pub password2: String,
    /// CSRFトークン
    #[serde(skip_serializing)]
    pub csrf_token: Option<String>,
}

impl RegisterForm {
    /// 入力形式と重複を検証
    ///
    /// 形式が正しいフィールドについてのみ、登録済みかをデータベースで確認する。
    pub async fn validate(&self, pool: &SqlitePool) -> Result<FieldErrors, FlowError> {
        let mut errors = FieldErrors::new();

        check_email_shape(&mut errors, &self.email);
        if !errors.contains_key("email")
            && crate::db::users::find_by_email(pool, &self.email)
                .await?
                .is_some()
        {
            push(&mut errors, "email", EMAIL_TAKEN);
        }

        let username = self.username.trim();
        if username.is_empty() {
            push(&mut errors, "username", REQUIRED);
        } else {
            check_length(&mut errors, "username", username);
            if !USERNAME_RE.is_match(username) {
                push(&mut errors, "username", USERNAME_CHARSET);
            }
            if !errors.contains_key("username")
                && crate::db::users::find_by_username(pool, username)
                    .await?
                    .is_some()
            {
                push(&mut errors, "username", USERNAME_TAKEN);
            }
        }

        if self.password.is_empty() {
            push(&mut errors, "password", REQUIRED);
        } else if self.password != self.password2 {
            push(&mut errors, "password", PASSWORDS_MUST_MATCH);
        }
        if self.password2.is_empty() {
            push(&mut errors, "password2", REQUIRED);
        }

        Ok(errors)
    }
}

fn push(errors: &mut FieldErrors, field: &'static str, message: &str) {
    errors.entry(field).or_default().push(message.to_string());
}

fn check_length(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if value.chars().count() > MAX_FIELD_LENGTH {
        push(
            errors,
            field,
            &format!("Field must be between 1 and {} characters long.", MAX_FIELD_LENGTH),
        );
    }
}

fn check_email_shape(errors: &mut FieldErrors, email: &str) {
    let email = email.trim();
    if email.is_empty() {
        push(errors, "email", REQUIRED);
        return;
    }
    check_length(errors, "email", email);
    if !EMAIL_RE.is_match(email) {
        push(errors, "email", INVALID_EMAIL);
    }
}
