//! Configuration module for eduboard.

use serde::Deserialize;
use std::path::Path;

use crate::{EduboardError, Result};

/// Longest accepted session lifetime (one year).
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Largest accepted request body or upload size, in MB.
pub const MAX_SIZE_MB: u64 = 1024;

/// Web server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number for the HTTP API.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Directory of a built frontend to serve at `/`, if any.
    #[serde(default)]
    pub static_dir: Option<String>,
    /// Maximum request body size in megabytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_mb: usize,
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    50
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
            static_dir: None,
            body_limit_mb: default_body_limit(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Store backend: `sqlite` or `memory`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_backend() -> String {
    "sqlite".to_string()
}

fn default_db_path() -> String {
    "data/eduboard.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_db_path(),
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
    /// Name of the cookie carrying the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Whether the session cookie is marked `Secure`.
    #[serde(default)]
    pub secure_cookie: bool,
}

fn default_session_ttl() -> u64 {
    24 * 60 * 60
}

fn default_cookie_name() -> String {
    "sessionID".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
            cookie_name: default_cookie_name(),
            secure_cookie: false,
        }
    }
}

/// Password hashing parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    /// Argon2 lanes.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

fn default_argon2_memory() -> u32 {
    crate::auth::DEFAULT_MEMORY_KIB
}

fn default_argon2_iterations() -> u32 {
    crate::auth::DEFAULT_ITERATIONS
}

fn default_argon2_parallelism() -> u32 {
    crate::auth::DEFAULT_PARALLELISM
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            argon2_memory_kib: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    /// Directory uploaded pictures are written to.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// URL prefix the storage directory is served under.
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_storage_path() -> String {
    "files".to_string()
}

fn default_public_prefix() -> String {
    "/files".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            public_prefix: default_public_prefix(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Background entry-index reconciliation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReconcileConfig {
    /// Seconds between sweeps. 0 disables the sweep.
    #[serde(default)]
    pub interval_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/eduboard.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Web server configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Password hashing configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Upload storage configuration.
    #[serde(default)]
    pub uploads: UploadsConfig,
    /// Reconciliation configuration.
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(EduboardError::Io)?;
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
        toml::from_str(s).map_err(|e| EduboardError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `EDUBOARD_HOST`: bind address
    /// - `EDUBOARD_PORT`: listen port (ignored unless it parses)
    /// - `EDUBOARD_DATABASE_PATH`: SQLite database file
    /// - `EDUBOARD_LOG_LEVEL`: log level
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        fn var(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.is_empty())
        }

        if let Some(host) = var("EDUBOARD_HOST") {
            self.web.host = host;
        }
        if let Some(port) = var("EDUBOARD_PORT").and_then(|p| p.parse().ok()) {
            self.web.port = port;
        }
        if let Some(path) = var("EDUBOARD_DATABASE_PATH") {
            self.database.path = path;
        }
        if let Some(level) = var("EDUBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the session TTL is zero
    /// - the session cookie name is empty
    /// - the database backend is unknown
    pub fn validate(&self) -> Result<()> {
        if self.session.ttl_secs == 0 {
            return Err(EduboardError::Config(
                "session.ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.session.ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(EduboardError::Config(format!(
                "session.ttl_secs must be at most {MAX_SESSION_TTL_SECS}"
            )));
        }
        if self.web.body_limit_mb > MAX_SIZE_MB as usize {
            return Err(EduboardError::Config(format!(
                "web.body_limit_mb must be at most {MAX_SIZE_MB}"
            )));
        }
        if self.uploads.max_upload_size_mb > MAX_SIZE_MB {
            return Err(EduboardError::Config(format!(
                "uploads.max_upload_size_mb must be at most {MAX_SIZE_MB}"
            )));
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(EduboardError::Config(
                "session.cookie_name must not be empty".to_string(),
            ));
        }
        match self.database.backend.as_str() {
            "sqlite" | "memory" => {}
            other => {
                return Err(EduboardError::Config(format!(
                    "unknown database backend '{other}' (expected 'sqlite' or 'memory')"
                )))
            }
        }
        Ok(())
    }
}
