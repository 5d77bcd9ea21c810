//! Configuration module for gymdesk.

use serde::Deserialize;
use std::path::Path;

use crate::{GymError, Result};

/// Minimum session secret length accepted in production.
pub const MIN_PRODUCTION_SECRET_LENGTH: usize = 32;

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (cookies are not marked `Secure`).
    #[default]
    Development,
    /// Production deployment.
    Production,
}

impl Environment {
    /// Whether this is a production deployment.
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deployment environment.
    #[serde(default)]
    pub environment: Environment,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Rate limit for the login endpoint (requests per minute per client).
    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit: u32,
    /// Key rate limits on `X-Forwarded-For`/`X-Real-IP` instead of the peer
    /// address. Only enable behind a reverse proxy that sets these headers.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_login_rate_limit() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            cors_origins: vec![],
            login_rate_limit: default_login_rate_limit(),
            trust_proxy_headers: false,
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
    "data/gymdesk.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Opened in append mode.
    #[serde(default = "default_log_file")]
    pub file: String,
    /// Line format for both the console and the file.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/gymdesk.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
            format: LogFormat::default(),
        }
    }
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Signing secret for session tokens. Must be set.
    #[serde(default)]
    pub secret: String,
    /// Session lifetime in seconds.
    #[serde(default = "default_session_lifetime")]
    pub lifetime_secs: u64,
}

fn default_session_lifetime() -> u64 {
    24 * 60 * 60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            lifetime_secs: default_session_lifetime(),
        }
    }
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
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(GymError::Io)?;
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
        toml::from_str(s).map_err(|e| GymError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `GYMDESK_SESSION_SECRET`: session signing secret
    /// - `GYMDESK_ENV`: `development` or `production`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("GYMDESK_SESSION_SECRET") {
            if !secret.is_empty() {
                self.session.secret = secret;
            }
        }

        if let Ok(env) = std::env::var("GYMDESK_ENV") {
            match Environment::parse(&env) {
                Some(environment) => self.server.environment = environment,
                None => tracing::warn!(value = %env, "Ignoring unknown GYMDESK_ENV value"),
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the session secret is not set
    /// - the session secret is too short for production
    /// - the session lifetime is zero
    pub fn validate(&self) -> Result<()> {
        if self.session.secret.is_empty() {
            return Err(GymError::Config(
                "session secret is not set. \
                 Set [session].secret in config.toml or the GYMDESK_SESSION_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.server.environment.is_production()
            && self.session.secret.len() < MIN_PRODUCTION_SECRET_LENGTH
        {
            return Err(GymError::Config(format!(
                "session secret must be at least {MIN_PRODUCTION_SECRET_LENGTH} bytes in production"
            )));
        }
        if self.session.lifetime_secs == 0 {
            return Err(GymError::Config(
                "session lifetime must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.environment, Environment::Development);
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.server.login_rate_limit, 10);
        assert!(!config.server.trust_proxy_headers);

        assert_eq!(config.database.path, "data/gymdesk.db");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/gymdesk.log");
        assert_eq!(config.logging.format, LogFormat::Text);

        assert!(config.session.secret.is_empty());
        assert_eq!(config.session.lifetime_secs, 86400);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080
environment = "production"
cors_origins = ["https://gym.example.com"]
login_rate_limit = 3
trust_proxy_headers = true

[database]
path = "custom/gym.sqlite"

[logging]
level = "debug"
file = "custom/logs/app.log"
format = "json"

[session]
secret = "0123456789abcdef0123456789abcdef"
lifetime_secs = 3600
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Production);
        assert_eq!(config.server.cors_origins, vec!["https://gym.example.com"]);
        assert_eq!(config.server.login_rate_limit, 3);
        assert!(config.server.trust_proxy_headers);
        assert_eq!(config.database.path, "custom/gym.sqlite");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.session.secret, "0123456789abcdef0123456789abcdef");
        assert_eq!(config.session.lifetime_secs, 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[server]
port = 4000
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.path, "data/gymdesk.db");
        assert_eq!(config.session.lifetime_secs, 86400);
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(GymError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_parse_unknown_environment() {
        let toml = r#"
[server]
environment = "staging"
"#;
        assert!(Config::parse(toml).is_err());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(GymError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[session]\nsecret = \"file-secret\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.session.secret, "file-secret");
    }

    // Both env vars are exercised in one test to avoid races between tests
    // mutating the process environment.
    #[test]
    fn test_apply_env_overrides() {
        let original_secret = std::env::var("GYMDESK_SESSION_SECRET").ok();
        let original_env = std::env::var("GYMDESK_ENV").ok();

        std::env::set_var("GYMDESK_SESSION_SECRET", "env-secret-key");
        std::env::set_var("GYMDESK_ENV", "production");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.session.secret, "env-secret-key");
        assert_eq!(config.server.environment, Environment::Production);

        // The environment wins over the file
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[session]\nsecret = \"file-secret\"\n").unwrap();
        let config = Config::load_with_env(&path).unwrap();
        assert_eq!(config.session.secret, "env-secret-key");
        assert_eq!(config.server.environment, Environment::Production);

        std::env::set_var("GYMDESK_SESSION_SECRET", "");
        std::env::set_var("GYMDESK_ENV", "bogus");
        let mut config = Config::default();
        config.session.secret = "original-secret".to_string();
        config.apply_env_overrides();
        assert_eq!(config.session.secret, "original-secret");
        assert_eq!(config.server.environment, Environment::Development);

        match original_secret {
            Some(val) => std::env::set_var("GYMDESK_SESSION_SECRET", val),
            None => std::env::remove_var("GYMDESK_SESSION_SECRET"),
        }
        match original_env {
            Some(val) => std::env::set_var("GYMDESK_ENV", val),
            None => std::env::remove_var("GYMDESK_ENV"),
        }
    }

    #[test]
    fn test_validate_missing_secret() {
        let config = Config::default();

        let result = config.validate();
        assert!(result.is_err());
        if let Err(GymError::Config(msg)) = result {
            assert!(msg.contains("session secret"));
        }
    }

    #[test]
    fn test_validate_short_secret_in_production() {
        let mut config = Config::default();
        config.session.secret = "short".to_string();
        assert!(config.validate().is_ok());

        config.server.environment = Environment::Production;
        assert!(config.validate().is_err());

        config.session.secret = "x".repeat(MIN_PRODUCTION_SECRET_LENGTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_lifetime() {
        let mut config = Config::default();
        config.session.secret = "secret".to_string();
        config.session.lifetime_secs = 0;
        assert!(config.validate().is_err());
    }
}
