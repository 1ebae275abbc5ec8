//! Error types for fitplan.

use reqwest::StatusCode;

/// Configuration problems. All of them block the whole page.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Gemini API Key not found. Please check your .env file.")]
    MissingApiKey,

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures of the external generation capability.
///
/// `Init` is fatal for the session; every other variant is recoverable and
/// reported inline next to the form that triggered it.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Failed to initialize Gemini model: {0}")]
    Init(String),

    #[error("request to {provider} failed: {reason}")]
    Request { provider: String, reason: String },

    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: String,
        status: StatusCode,
        body: String,
    },

    #[error("{provider} error: {message}")]
    Api { provider: String, message: String },

    #[error("invalid response from {provider}: {reason}")]
    Decode { provider: String, reason: String },

    #[error("{provider} returned no text")]
    EmptyResponse { provider: String },
}

/// Rejected profile form input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a number")]
    NotANumber { field: &'static str },

    #[error("Invalid form submission: {0}")]
    Malformed(String),
}

/// Controller-level failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Generate your plans before asking questions")]
    PlansNotReady,

    #[error("An error occurred while generating plans: {0}")]
    PlanGeneration(#[source] GenerationError),

    #[error("Failed to get answer: {0}")]
    Answer(#[source] GenerationError),
}
