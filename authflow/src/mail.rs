//! メール送信
//!
//! 送信手段は`Mailer`トレイトで抽象化する。`LogMailer`はログに出力するだけで、
//! `MemoryMailer`は送信内容を保持してテストから参照できるようにする。

use crate::common::auth::User;
use crate::common::error::FlowError;
use crate::config::AppConfig;
use crate::views::Templates;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// 送信するメール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    /// 送信元
    pub from: String,
    /// 宛先
    pub to: String,
    /// 件名
    pub subject: String,
    /// 本文（プレーンテキスト）
    pub body: String,
}

/// メール送信の抽象
#[async_trait]
pub trait Mailer: Send + Sync {
    /// メールを送信する
    async fn send(&self, email: Email) -> Result<(), FlowError>;
}

/// ログにのみ出力するMailer（開発用）
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), FlowError> {
        tracing::info!(to = %email.to, subject = %email.subject, "Sending email");
        tracing::debug!(body = %email.body, "Email body");
        Ok(())
    }
}

/// 送信内容をメモリに保持するMailer（テスト用）
#[derive(Debug, Default, Clone)]
pub struct MemoryMailer {
    outbox: Arc<Mutex<Vec<Email>>>,
}

impl MemoryMailer {
    /// 空のMailerを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// これまでに送信されたメール
    pub fn sent(&self) -> Vec<Email> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    /// 指定宛先に最後に送信されたメール
    pub fn last_to(&self, to: &str) -> Option<Email> {
        self.sent().into_iter().rev().find(|email| email.to == to)
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: Email) -> Result<(), FlowError> {
        self.outbox
            .lock()
            .map_err(|_| FlowError::Mail("outbox lock poisoned".to_string()))?
            .push(email);
        Ok(())
    }
}

/// 確認メールを組み立てる
pub fn confirmation_email(
    config: &AppConfig,
    templates: &Templates,
    user: &User,
    token: &str,
) -> Result<Email, FlowError> {
    let confirm_url = format!(
        "{}/auth/confirm/{}",
        config.base_url.trim_end_matches('/'),
        token
    );
    let body = templates.render(
        "auth/email/confirm.txt",
        minijinja::context! {
            app_name => &config.app_name,
            username => &user.username,
            confirm_url => confirm_url,
        },
    )?;

    Ok(Email {
        from: config.mail_sender.clone(),
        to: user.email.clone(),
        subject: format!("{} Confirm Your Account", config.mail_subject_prefix),
        body,
    })
}
