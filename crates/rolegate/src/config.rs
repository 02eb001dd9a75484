//! Configuration loading and management

use anyhow::{Context, Result};
use rolegate_api::WebSettings;
use rolegate_auth::HashSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Shortest accepted remember-me validity (1 minute)
const MIN_REMEMBER_ME_VALIDITY_SECS: i64 = 60;
/// Longest accepted remember-me validity (365 days)
const MAX_REMEMBER_ME_VALIDITY_SECS: i64 = 365 * 24 * 60 * 60;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub remember_me: RememberMeConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Root of the `/js` and `/images` trees
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            static_dir: None,
        }
    }
}

/// Password encoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_encoder_secret")]
    pub encoder_secret: String,
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            encoder_secret: default_encoder_secret(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl AuthConfig {
    pub fn hash_settings(&self) -> HashSettings {
        HashSettings {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

/// Remember-me configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RememberMeConfig {
    /// Mixed into every stored token digest
    #[serde(default = "default_remember_me_key")]
    pub key: String,
    /// Login form field that requests a token
    #[serde(default = "default_remember_me_parameter")]
    pub parameter: String,
    #[serde(default = "default_remember_me_cookie")]
    pub cookie_name: String,
    /// Valid range: 60-31536000 seconds (1 minute to 365 days)
    #[serde(default = "default_remember_me_validity_secs")]
    pub validity_seconds: i64,
    #[serde(default = "default_true")]
    pub secure_cookie: bool,
}

impl Default for RememberMeConfig {
    fn default() -> Self {
        Self {
            key: default_remember_me_key(),
            parameter: default_remember_me_parameter(),
            cookie_name: default_remember_me_cookie(),
            validity_seconds: default_remember_me_validity_secs(),
            secure_cookie: true,
        }
    }
}

impl RememberMeConfig {
    /// Clamps validity to [60, 31536000] seconds and logs a warning if adjusted.
    pub fn validated_validity_secs(&self) -> i64 {
        if self.validity_seconds < MIN_REMEMBER_ME_VALIDITY_SECS {
            warn!(
                "remember_me.validity_seconds {} is below minimum {}, using minimum",
                self.validity_seconds, MIN_REMEMBER_ME_VALIDITY_SECS
            );
            MIN_REMEMBER_ME_VALIDITY_SECS
        } else if self.validity_seconds > MAX_REMEMBER_ME_VALIDITY_SECS {
            warn!(
                "remember_me.validity_seconds {} exceeds maximum {}, using maximum",
                self.validity_seconds, MAX_REMEMBER_ME_VALIDITY_SECS
            );
            MAX_REMEMBER_ME_VALIDITY_SECS
        } else {
            self.validity_seconds
        }
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_cookie")]
    pub cookie_name: String,
    #[serde(default = "default_inactivity_minutes")]
    pub inactivity_minutes: i64,
    #[serde(default = "default_true")]
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_session_cookie(),
            inactivity_minutes: default_inactivity_minutes(),
            secure_cookie: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "default_true")]
    pub csrf_enabled: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self { csrf_enabled: true }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_encoder_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    19456
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}

fn default_remember_me_key() -> String {
    "pwd@123QWE".to_string()
}

fn default_remember_me_parameter() -> String {
    "remember-me".to_string()
}

fn default_remember_me_cookie() -> String {
    "remember_me".to_string()
}

fn default_remember_me_validity_secs() -> i64 {
    86400 // 1 day
}

fn default_session_cookie() -> String {
    "rolegate.sid".to_string()
}

fn default_inactivity_minutes() -> i64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }

    /// HTTP-level settings for the router
    pub fn web_settings(&self) -> WebSettings {
        WebSettings {
            remember_me_parameter: self.remember_me.parameter.clone(),
            remember_me_cookie: self.remember_me.cookie_name.clone(),
            remember_me_secure: self.remember_me.secure_cookie,
            session_cookie: self.session.cookie_name.clone(),
            session_secure: self.session.secure_cookie,
            session_inactivity_minutes: self.session.inactivity_minutes,
            csrf_enabled: self.security.csrf_enabled,
            static_dir: self.server.static_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.remember_me.key, "pwd@123QWE");
        assert_eq!(config.remember_me.validity_seconds, 86400);
        assert_eq!(config.session.cookie_name, "rolegate.sid");
        assert!(config.security.csrf_enabled);
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090
static_dir = "./static"

[remember_me]
validity_seconds = 3600
secure_cookie = false

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.remember_me.validity_seconds, 3600);
        assert!(!config.remember_me.secure_cookie);
        assert_eq!(config.remember_me.cookie_name, "remember_me");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.auth.hash_settings(), HashSettings::default());

        let web = config.web_settings();
        assert!(!web.remember_me_secure);
        assert!(web.session_secure);
        assert_eq!(web.static_dir, Some(PathBuf::from("./static")));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = \"not a number\"").unwrap();

        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_validity_clamped() {
        let mut remember_me = RememberMeConfig::default();
        assert_eq!(remember_me.validated_validity_secs(), 86400);

        remember_me.validity_seconds = 5;
        assert_eq!(remember_me.validated_validity_secs(), 60);

        remember_me.validity_seconds = i64::MAX;
        assert_eq!(remember_me.validated_validity_secs(), 31_536_000);
    }
}
