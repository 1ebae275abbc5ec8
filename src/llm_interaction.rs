use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::agent::AgentProfile;
use crate::config::LlmConfig;
use crate::error::GenerationError;

const PROVIDER: &str = "Gemini";

/// The external text-generation capability every plan and answer comes from.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn model_name(&self) -> &str;

    /// Runs one prompt under the agent's system instruction and returns the
    /// generated text.
    async fn generate(&self, agent: &AgentProfile, prompt: &str) -> Result<String, GenerationError>;
}

// Structures matching Gemini's generateContent endpoint
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiApiError>,
}

#[derive(Deserialize, Debug)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize, Debug)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize, Debug)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GeminiApiError {
    message: String,
}

pub struct GeminiClient {
    client: Client,
    endpoint: String,
    config: LlmConfig,
}

impl GeminiClient {
    /// Builds the HTTP client. Fails for an empty model id or if the client
    /// cannot be constructed; either leaves the page unusable.
    pub fn new(config: LlmConfig) -> Result<Self, GenerationError> {
        if config.model.trim().is_empty() {
            return Err(GenerationError::Init("model id is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GenerationError::Init(e.to_string()))?;

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.api_base.trim_end_matches('/'),
            config.model
        );
        info!("Using {} (model: {})", PROVIDER, config.model);

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    fn request_failed(reason: impl ToString) -> GenerationError {
        GenerationError::Request {
            provider: PROVIDER.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip(self, agent, prompt), fields(agent = agent.name, model = %self.config.model))]
    async fn generate(&self, agent: &AgentProfile, prompt: &str) -> Result<String, GenerationError> {
        let request_payload = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiTextPart {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: agent.system_instruction().map(|text| GeminiSystemInstruction {
                parts: vec![GeminiTextPart { text }],
            }),
        };

        debug!(prompt_len = prompt.len(), "Sending generateContent request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(&request_payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Gemini request could not be sent");
                Self::request_failed(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %body, "Gemini API request failed");
            return Err(GenerationError::Status {
                provider: PROVIDER.to_string(),
                status,
                body,
            });
        }

        let gemini_response = response
            .json::<GeminiResponse>()
            .await
            .map_err(|e| GenerationError::Decode {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        if let Some(api_error) = gemini_response.error {
            error!(message = %api_error.message, "Gemini returned an error object");
            return Err(GenerationError::Api {
                provider: PROVIDER.to_string(),
                message: api_error.message,
            });
        }

        let text: String = gemini_response
            .candidates
            .into_iter()
            .flatten()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse {
                provider: PROVIDER.to_string(),
            });
        }

        debug!(response_len = text.len(), "Received Gemini response");
        Ok(text.trim().to_string())
    }
}
