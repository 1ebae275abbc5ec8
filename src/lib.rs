pub mod agent;
pub mod app_state;
pub mod config;
pub mod constants;
pub mod error;
pub mod llm_interaction;
pub mod plan;
pub mod profile;
pub mod render;
pub mod session;
pub mod web_server;

use std::sync::Arc;

use tracing::error;

use crate::config::LlmConfig;
use crate::error::ConfigError;
use crate::llm_interaction::GeminiClient;
use crate::session::SessionController;
use crate::web_server::Backend;

/// Turns the model configuration into a ready backend, or a blocked one
/// carrying the message every page will show.
pub fn backend_from_config(config: Result<LlmConfig, ConfigError>) -> Backend {
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Backend::Blocked(e.to_string());
        }
    };

    match GeminiClient::new(config) {
        Ok(client) => Backend::Ready(SessionController::new(Arc::new(client))),
        Err(e) => {
            error!("{}", e);
            Backend::Blocked(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_missing_key_blocks_backend() {
        match backend_from_config(Err(ConfigError::MissingApiKey)) {
            Backend::Blocked(reason) => {
                assert_eq!(reason, "Gemini API Key not found. Please check your .env file.")
            }
            Backend::Ready(_) => panic!("expected a blocked backend"),
        }
    }

    #[test]
    fn test_model_init_failure_blocks_backend() {
        let config = LlmConfig::new(
            Some("key".to_string()),
            String::new(),
            "http://localhost:1".to_string(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(matches!(backend_from_config(Ok(config)), Backend::Blocked(_)));
    }

    #[test]
    fn test_valid_config_is_ready() {
        let config = LlmConfig::new(
            Some("key".to_string()),
            "gemini-test".to_string(),
            "http://localhost:1".to_string(),
            Duration::from_secs(1),
        )
        .unwrap();
        match backend_from_config(Ok(config)) {
            Backend::Ready(controller) => assert_eq!(controller.model_name(), "gemini-test"),
            Backend::Blocked(reason) => panic!("unexpected block: {}", reason),
        }
    }
}
