//! Configuration module for Sharebox.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, ShareboxError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/sharebox.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Collection storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one sub-directory per regular account.
    #[serde(default = "default_storage_root")]
    pub root: String,
}

fn default_storage_root() -> String {
    "data/collections".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Secret used to sign session tokens (must be set).
    #[serde(default)]
    pub secret: String,
    /// Session lifetime in seconds.
    #[serde(default = "default_session_expiry")]
    pub expiry_secs: u64,
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Mark the cookie `Secure` (HTTPS only).
    #[serde(default)]
    pub secure_cookie: bool,
}

fn default_session_expiry() -> u64 {
    crate::auth::DEFAULT_SESSION_TTL_SECS
}

fn default_cookie_name() -> String {
    "sharebox_session".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            expiry_secs: default_session_expiry(),
            cookie_name: default_cookie_name(),
            secure_cookie: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty disables file logging.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/sharebox.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// First-run admin account.
///
/// Only used when the account table is empty at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    /// Username of the initial admin account.
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    /// Display name of the initial admin account.
    #[serde(default)]
    pub admin_display_name: Option<String>,
    /// Password of the initial admin account.
    ///
    /// Normally supplied through `SHAREBOX_ADMIN_PASSWORD`.
    #[serde(default)]
    pub admin_password: String,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            admin_display_name: None,
            admin_password: String::new(),
        }
    }
}

/// Remote catalog configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CatalogConfig {
    /// Path to the drive-sync JSON listing. Empty disables the catalog.
    #[serde(default)]
    pub path: String,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Collection storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// First-run admin account.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    /// Remote catalog configuration.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ShareboxError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ShareboxError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `SHAREBOX_SESSION_SECRET`: session signing secret
    /// - `SHAREBOX_ADMIN_PASSWORD`: password for the bootstrap admin
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("SHAREBOX_SESSION_SECRET") {
            if !secret.is_empty() {
                self.session.secret = secret;
            }
        }
        if let Ok(password) = std::env::var("SHAREBOX_ADMIN_PASSWORD") {
            if !password.is_empty() {
                self.bootstrap.admin_password = password;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.session.secret.is_empty() {
            return Err(ShareboxError::Config(
                "session secret is not set. \
                 Set it in config.toml or via SHAREBOX_SESSION_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.session.expiry_secs == 0 {
            return Err(ShareboxError::Config(
                "session.expiry_secs must be greater than zero".to_string(),
            ));
        }
        if self.storage.root.trim().is_empty() {
            return Err(ShareboxError::Config("storage.root must be set".to_string()));
        }
        Ok(())
    }
}
