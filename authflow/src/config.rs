//! Configuration management via environment variables
//!
//! Configuration is selected by profile (development / testing / production)
//! and then overlaid with environment variables. Every variable has a
//! preferred `AUTHFLOW_*` name and may also be read from a deprecated name,
//! in which case a warning is logged.

use crate::common::error::FlowError;
use std::time::Duration;

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use authflow::config::get_env_with_fallback;
///
/// let url = get_env_with_fallback("AUTHFLOW_DATABASE_URL", "DATABASE_URL");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither variable is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// 設定プロファイル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigProfile {
    /// ローカル開発
    Development,
    /// テスト（インメモリDB、CSRF無効）
    Testing,
    /// 本番
    Production,
}

impl std::str::FromStr for ConfigProfile {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" | "default" => Ok(ConfigProfile::Development),
            "testing" | "test" => Ok(ConfigProfile::Testing),
            "production" | "prod" => Ok(ConfigProfile::Production),
            other => Err(FlowError::Config(format!("Unknown config profile: {}", other))),
        }
    }
}

impl std::fmt::Display for ConfigProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigProfile::Development => write!(f, "development"),
            ConfigProfile::Testing => write!(f, "testing"),
            ConfigProfile::Production => write!(f, "production"),
        }
    }
}

/// アプリケーション設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 選択されたプロファイル
    pub profile: ConfigProfile,
    /// 表示用アプリケーション名
    pub app_name: String,
    /// バインドホスト
    pub host: String,
    /// 待ち受けポート
    pub port: u16,
    /// sqlx接続URL
    pub database_url: String,
    /// セッション・トークン署名鍵
    pub secret_key: String,
    /// メール内リンク用の外部URL
    pub base_url: String,
    /// 管理者ロールを付与するメールアドレス
    pub admin_email: Option<String>,
    /// 送信元アドレス
    pub mail_sender: String,
    /// 件名プレフィックス
    pub mail_subject_prefix: String,
    /// 確認トークンの有効期間
    pub confirmation_ttl: Duration,
    /// セッションの有効期間
    pub session_ttl: Duration,
    /// remember me有効時の有効期間
    pub remember_ttl: Duration,
    /// bcryptコスト
    pub bcrypt_cost: u32,
    /// フォームのCSRF検証を行うか
    pub csrf_enabled: bool,
}

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BCRYPT_COST: u32 = 12;
const TESTING_BCRYPT_COST: u32 = 4;
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;
/// トークン有効期間の上限（100年）
const MAX_TOKEN_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

impl AppConfig {
    /// プロファイルのデフォルト設定を生成（環境変数は参照しない）
    ///
    /// development/testingでは署名鍵をランダム生成する。productionでは空のままで、
    /// `from_env`で必ず設定される必要がある。
    pub fn for_profile(profile: ConfigProfile) -> Self {
        let (database_url, bcrypt_cost, csrf_enabled, secret_key) = match profile {
            ConfigProfile::Development => (
                "sqlite:data/authflow-dev.db".to_string(),
                DEFAULT_BCRYPT_COST,
                true,
                crate::auth::generate_random_token(48),
            ),
            ConfigProfile::Testing => (
                "sqlite::memory:".to_string(),
                TESTING_BCRYPT_COST,
                false,
                crate::auth::generate_random_token(48),
            ),
            ConfigProfile::Production => (
                "sqlite:data/authflow.db".to_string(),
                DEFAULT_BCRYPT_COST,
                true,
                String::new(),
            ),
        };

        Self {
            profile,
            app_name: "Authflow".to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url,
            secret_key,
            base_url: format!("http://{}:{}", DEFAULT_HOST, DEFAULT_PORT),
            admin_email: None,
            mail_sender: "Authflow Admin <authflow@example.com>".to_string(),
            mail_subject_prefix: "[Authflow]".to_string(),
            confirmation_ttl: Duration::from_secs(3600),
            session_ttl: Duration::from_secs(86_400),
            remember_ttl: Duration::from_secs(365 * 86_400),
            bcrypt_cost,
            csrf_enabled,
        }
    }

    /// テスト用設定
    pub fn testing() -> Self {
        Self::for_profile(ConfigProfile::Testing)
    }

    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, FlowError> {
        let profile: ConfigProfile =
            get_env_with_fallback_or("AUTHFLOW_CONFIG", "FLASK_CONFIG", "development").parse()?;
        let mut config = Self::for_profile(profile);

        config.host =
            get_env_with_fallback_or("AUTHFLOW_HOST", "FLASK_RUN_HOST", &config.host);
        config.port =
            get_env_with_fallback_parse("AUTHFLOW_PORT", "FLASK_RUN_PORT", config.port);
        if let Some(url) = get_env_with_fallback("AUTHFLOW_DATABASE_URL", "DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(secret) = get_env_with_fallback("AUTHFLOW_SECRET_KEY", "SECRET_KEY") {
            config.secret_key = secret;
        }
        config.base_url = get_env_with_fallback("AUTHFLOW_BASE_URL", "BASE_URL")
            .unwrap_or_else(|| format!("http://{}:{}", config.host, config.port));
        config.admin_email = get_env_with_fallback("AUTHFLOW_ADMIN", "FLASKY_ADMIN")
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty());
        config.mail_sender = get_env_with_fallback_or(
            "AUTHFLOW_MAIL_SENDER",
            "MAIL_SENDER",
            &config.mail_sender,
        );
        config.mail_subject_prefix = get_env_with_fallback_or(
            "AUTHFLOW_MAIL_SUBJECT_PREFIX",
            "MAIL_SUBJECT_PREFIX",
            &config.mail_subject_prefix,
        );
        config.confirmation_ttl = Duration::from_secs(get_env_with_fallback_parse(
            "AUTHFLOW_CONFIRMATION_TTL_SECS",
            "CONFIRMATION_TTL_SECS",
            config.confirmation_ttl.as_secs(),
        ));
        config.session_ttl = Duration::from_secs(get_env_with_fallback_parse(
            "AUTHFLOW_SESSION_TTL_SECS",
            "SESSION_TTL_SECS",
            config.session_ttl.as_secs(),
        ));
        config.remember_ttl = Duration::from_secs(get_env_with_fallback_parse(
            "AUTHFLOW_REMEMBER_TTL_SECS",
            "REMEMBER_TTL_SECS",
            config.remember_ttl.as_secs(),
        ));

        config.validate()?;
        Ok(config)
    }

    /// 設定値の整合性を検証
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.secret_key.is_empty() {
            return Err(FlowError::Config(format!(
                "AUTHFLOW_SECRET_KEY must be set for the {} profile",
                self.profile
            )));
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(FlowError::Config(format!(
                "bcrypt cost out of range: {}",
                self.bcrypt_cost
            )));
        }
        if self.confirmation_ttl.is_zero() || self.session_ttl.is_zero() {
            return Err(FlowError::Config(
                "token lifetimes must be greater than zero".to_string(),
            ));
        }
        for (name, ttl) in [
            ("confirmation", self.confirmation_ttl),
            ("session", self.session_ttl),
            ("remember", self.remember_ttl),
        ] {
            if ttl > MAX_TOKEN_TTL {
                return Err(FlowError::Config(format!(
                    "{} lifetime too long: {}s (max {}s)",
                    name,
                    ttl.as_secs(),
                    MAX_TOKEN_TTL.as_secs()
                )));
            }
        }
        Ok(())
    }

    /// `host:port` 形式のバインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
