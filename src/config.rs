//! Runtime configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::constants;
use crate::error::ConfigError;

/// Settings for the Gemini client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: SecretString,
    pub model: String,
    pub api_base: String,
    /// Per-request timeout enforced by the HTTP client.
    pub request_timeout: Duration,
}

impl LlmConfig {
    /// A missing or blank key is a configuration error that blocks the page.
    pub fn new(
        api_key: Option<String>,
        model: String,
        api_base: String,
        request_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            api_key: SecretString::from(api_key),
            model,
            api_base,
            request_timeout,
        })
    }
}

/// Web server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
    /// Sessions untouched for this long are dropped.
    pub session_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], constants::DEFAULT_PORT)),
            templates_dir: PathBuf::from(constants::TEMPLATES_DIR.as_str()),
            static_dir: PathBuf::from(constants::STATIC_DIR.as_str()),
            session_ttl: Duration::from_secs(constants::DEFAULT_SESSION_TTL_SECS),
        }
    }
}
