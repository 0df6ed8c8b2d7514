//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or an environment variable; a `.env`
//! file in the working directory is loaded first (see [`Config::load`]).

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::infrastructure::mailer::SmtpSettings;

/// Chattrix direct-messaging server
#[derive(Debug, Clone, Parser)]
#[command(name = "chattrix-server", version, about)]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// SQLite connection URL (`sqlite::memory:` for a throwaway database)
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://chattrix.db")]
    pub database_url: String,

    /// Directory that holds uploaded images
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Allowed CORS origin, `*` for any
    #[arg(long, env = "CORS_ORIGIN", default_value = "*")]
    pub cors_origin: String,

    /// Require an emailed code before an account is created
    #[arg(long, env = "EMAIL_VERIFICATION")]
    pub email_verification: bool,

    #[command(flatten)]
    pub smtp: SmtpArgs,

    /// Default log level for this crate (`RUST_LOG` overrides it)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Outgoing mail for verification codes
#[derive(Debug, Clone, Args)]
pub struct SmtpArgs {
    /// SMTP relay host; leave empty to only log codes
    #[arg(id = "smtp_host", long = "smtp-host", env = "SMTP_HOST", default_value = "")]
    pub host: String,

    #[arg(id = "smtp_port", long = "smtp-port", env = "SMTP_PORT", default_value_t = 587)]
    pub port: u16,

    #[arg(long = "smtp-username", env = "SMTP_USERNAME")]
    pub username: Option<String>,

    #[arg(long = "smtp-password", env = "SMTP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(
        long = "smtp-from",
        env = "SMTP_FROM",
        default_value = "Chattrix <no-reply@chattrix.local>"
    )]
    pub from: String,
}

impl Config {
    /// Load `.env` (if present), then parse flags and environment
    pub fn load() -> Self {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            eprintln!("Failed to read .env: {}", e);
        }
        Self::parse()
    }

    /// `host:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings for [`crate::infrastructure::mailer::SmtpMailer`]
    pub fn smtp_settings(&self) -> SmtpSettings {
        SmtpSettings {
            host: self.smtp.host.clone(),
            port: self.smtp.port,
            username: self.smtp.username.clone(),
            password: self.smtp.password.clone(),
            from: self.smtp.from.clone(),
        }
    }
}
