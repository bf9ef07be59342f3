//! CLI module for authflow
//!
//! サーバー起動とデータベース準備のサブコマンドを提供する。

/// deploy サブコマンド
pub mod deploy;
/// serve サブコマンド
pub mod serve;

use clap::{Parser, Subcommand};

/// authflow - account registration, login and email confirmation
#[derive(Parser, Debug)]
#[command(name = "authflow")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    AUTHFLOW_CONFIG               Profile: development, testing, production (default: development)
    AUTHFLOW_HOST                 Bind address (default: 127.0.0.1)
    AUTHFLOW_PORT                 Listen port (default: 5000)
    AUTHFLOW_DATABASE_URL         Database URL
    AUTHFLOW_SECRET_KEY           Signing key (required in production)
    AUTHFLOW_BASE_URL             Absolute URL used in email links
    AUTHFLOW_ADMIN                Email address that receives the Administrator role
    AUTHFLOW_MAIL_SENDER          From address for outgoing mail
    AUTHFLOW_LOG_LEVEL            Log level (default: info)
    AUTHFLOW_LOG_DIR              Directory for daily rolling log files
"#)]
pub struct Cli {
    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server
    Serve(serve::ServeArgs),
    /// Create the database, run migrations and seed roles
    Deploy(deploy::DeployArgs),
}
