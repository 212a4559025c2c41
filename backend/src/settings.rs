//! Application settings loaded via OrthoConfig.
//!
//! Values layer defaults, an optional configuration file, `INSTITUTE_*`
//! environment variables and command-line flags. Optional fields fall back
//! to the defaults exposed by the accessor methods.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_TOKEN_TTL_HOURS: u64 = 168;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_LIVENESS_INTERVAL_SECS: u64 = 5;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Deployment mode controlling secret handling and error verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// `true` outside production.
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = SettingsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(SettingsError::UnknownEnvironment(raw.to_owned())),
        }
    }
}

/// Invalid setting values detected after loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unknown environment `{0}`; expected development or production")]
    UnknownEnvironment(String),
    #[error("invalid bind address `{0}`")]
    InvalidBindAddr(String),
    #[error("token secret is required in production")]
    MissingTokenSecret,
    #[error("bootstrap admin needs both an email and a password")]
    IncompleteBootstrapAdmin,
}

/// Server settings.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "INSTITUTE")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; without it the server runs on the in-process stores.
    pub database_url: Option<String>,
    /// `development` or `production`.
    pub environment: Option<String>,
    /// HMAC secret for session tokens.
    pub token_secret: Option<String>,
    /// Session token lifetime.
    pub token_ttl_hours: Option<u64>,
    /// Directory receiving admission attachments.
    pub upload_dir: Option<PathBuf>,
    /// Largest accepted attachment.
    pub max_upload_bytes: Option<usize>,
    /// Seconds between database liveness probes.
    pub liveness_interval_secs: Option<u64>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Administrator created at startup when no admin with this email exists.
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_configured", &self.database_url.is_some())
            .field("environment", &self.environment)
            .field("token_secret", &self.token_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("liveness_interval_secs", &self.liveness_interval_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("bootstrap_admin_email", &self.bootstrap_admin_email)
            .finish_non_exhaustive()
    }
}

impl AppSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim()
            .parse()
            .map_err(|_| SettingsError::InvalidBindAddr(raw.to_owned()))
    }

    /// Database URL when one is configured and non-blank.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Deployment mode, defaulting to development.
    pub fn environment(&self) -> Result<Environment, SettingsError> {
        self.environment
            .as_deref()
            .map_or(Ok(Environment::Development), Environment::from_str)
    }

    /// Configured token secret, if any.
    pub fn token_secret(&self) -> Option<&str> {
        self.token_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
    }

    /// Session token lifetime.
    pub fn token_ttl(&self) -> Duration {
        let hours = self.token_ttl_hours.unwrap_or(DEFAULT_TOKEN_TTL_HOURS);
        Duration::from_secs(hours.saturating_mul(3600))
    }

    /// Attachment directory.
    pub fn upload_dir(&self) -> &Path {
        self.upload_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_UPLOAD_DIR))
    }

    /// Attachment size cap in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    /// Interval between liveness probes; never zero.
    pub fn liveness_interval(&self) -> Duration {
        let secs = self
            .liveness_interval_secs
            .unwrap_or(DEFAULT_LIVENESS_INTERVAL_SECS)
            .max(1);
        Duration::from_secs(secs)
    }

    /// Pool size for PostgreSQL connections.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .max(1)
    }

    /// Bootstrap admin credentials when both halves are configured.
    pub fn bootstrap_admin(&self) -> Result<Option<(&str, &str)>, SettingsError> {
        let email = self
            .bootstrap_admin_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty());
        let password = self
            .bootstrap_admin_password
            .as_deref()
            .filter(|password| !password.is_empty());
        match (email, password) {
            (Some(email), Some(password)) => Ok(Some((email, password))),
            (None, None) => Ok(None),
            _ => Err(SettingsError::IncompleteBootstrapAdmin),
        }
    }
}
