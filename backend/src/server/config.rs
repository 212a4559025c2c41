//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;
use zeroize::Zeroizing;

use crate::outbound::persistence::PoolConfig;
use crate::outbound::security::generate_secret;
use crate::settings::{AppSettings, Environment, SettingsError};

const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(168 * 3600);
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_LIVENESS_INTERVAL: Duration = Duration::from_secs(5);

/// Administrator ensured at startup.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub(crate) email: String,
    pub(crate) password: Zeroizing<String>,
}

impl BootstrapAdmin {
    /// Credentials for the administrator to create when missing.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) environment: Environment,
    pub(crate) token_secret: Zeroizing<Vec<u8>>,
    pub(crate) token_ttl: Duration,
    pub(crate) upload_dir: PathBuf,
    pub(crate) max_upload_bytes: usize,
    pub(crate) liveness_interval: Duration,
    pub(crate) database: Option<PoolConfig>,
    pub(crate) bootstrap_admin: Option<BootstrapAdmin>,
}

impl ServerConfig {
    /// Development configuration without a database.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, token_secret: impl Into<Vec<u8>>, upload_dir: &Path) -> Self {
        Self {
            bind_addr,
            environment: Environment::Development,
            token_secret: Zeroizing::new(token_secret.into()),
            token_ttl: DEFAULT_TOKEN_TTL,
            upload_dir: upload_dir.to_path_buf(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            liveness_interval: DEFAULT_LIVENESS_INTERVAL,
            database: None,
            bootstrap_admin: None,
        }
    }

    /// Translate loaded settings.
    ///
    /// Without a configured token secret a random one is generated in
    /// development; production refuses to start.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, SettingsError> {
        let environment = settings.environment()?;
        let token_secret = match settings.token_secret() {
            Some(secret) => Zeroizing::new(secret.as_bytes().to_vec()),
            None if environment.is_development() => {
                warn!("no token secret configured; using an ephemeral secret (development only)");
                generate_secret()
            }
            None => return Err(SettingsError::MissingTokenSecret),
        };
        let database = settings.database_url().map(|url| {
            PoolConfig::new(url)
                .with_max_size(settings.db_max_connections())
                .with_connection_timeout(Duration::from_secs(5))
        });
        let bootstrap_admin = settings
            .bootstrap_admin()?
            .map(|(email, password)| BootstrapAdmin::new(email, password));

        Ok(Self {
            bind_addr: settings.bind_addr()?,
            environment,
            token_secret,
            token_ttl: settings.token_ttl(),
            upload_dir: settings.upload_dir().to_path_buf(),
            max_upload_bytes: settings.max_upload_bytes(),
            liveness_interval: settings.liveness_interval(),
            database,
            bootstrap_admin,
        })
    }

    /// Attach a database; admissions fail over to the in-process store while
    /// it is unreachable.
    #[must_use]
    pub fn with_database(mut self, pool: PoolConfig) -> Self {
        self.database = Some(pool);
        self
    }

    /// Ensure this administrator exists at startup.
    #[must_use]
    pub fn with_bootstrap_admin(mut self, admin: BootstrapAdmin) -> Self {
        self.bootstrap_admin = Some(admin);
        self
    }

    /// Override the deployment mode.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Override the attachment size cap.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Return the deployment mode.
    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Whether a PostgreSQL store is configured.
    #[must_use]
    pub fn has_database(&self) -> bool {
        self.database.is_some()
    }

    /// Email of the administrator ensured at startup, if any.
    #[must_use]
    pub fn bootstrap_admin_email(&self) -> Option<&str> {
        self.bootstrap_admin.as_ref().map(|admin| admin.email.as_str())
    }
}
