//! Gemini backend implementation.

use async_trait::async_trait;
use reqwest::Client;

use super::backend::{BackendConfig, BackendError, GenerativeBackend};

const DEFAULT_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini `generateContent` backend.
pub struct GeminiBackend {
    client: Client,
    config: BackendConfig,
}

impl GeminiBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Build configuration from the environment (`GEMINI_API_KEY`,
    /// optional `GEMINI_MODEL`).
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY").ok();

        if api_key.is_some() {
            tracing::info!("Gemini backend initialized with API key");
        } else {
            tracing::warn!(
                "Gemini backend created without API key - GEMINI_API_KEY env var not found"
            );
        }

        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(BackendConfig::new(api_key, model, DEFAULT_ENDPOINT))
    }

    /// Point the backend at a different endpoint (tests, proxies).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config = self.config.with_endpoint(endpoint);
        self
    }

    fn request_url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_payload(prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        })
    }

    /// Pull the generated text out of a `generateContent` response: the
    /// text parts of the first candidate, joined.
    fn parse_response(json: &serde_json::Value) -> Result<String, BackendError> {
        let parts = json["candidates"]
            .get(0)
            .and_then(|candidate| candidate["content"]["parts"].as_array())
            .ok_or_else(|| BackendError::Parse("response carries no candidates".to_string()))?;

        let text = parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(BackendError::Parse(
                "candidate carries no text parts".to_string(),
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| BackendError::Auth("No Gemini API key configured".to_string()))?;

        tracing::debug!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "sending generate request"
        );

        let response = self
            .client
            .post(self.request_url())
            .header("x-goog-api-key", api_key)
            .json(&Self::build_payload(prompt))
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        Self::parse_response(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> GeminiBackend {
        GeminiBackend::new(BackendConfig::new(None, DEFAULT_MODEL, DEFAULT_ENDPOINT))
    }

    #[test]
    fn payload_carries_the_prompt() {
        let payload = GeminiBackend::build_payload("fix my code");
        assert_eq!(payload["contents"][0]["parts"][0]["text"], "fix my code");
    }

    #[test]
    fn request_url_targets_the_model() {
        let backend = GeminiBackend::new(BackendConfig::new(
            Some("key".to_string()),
            "gemini-2.5-pro",
            "https://example.test/models/",
        ));
        assert_eq!(
            backend.request_url(),
            "https://example.test/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn parses_candidate_text_parts() {
        let json = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "print(" }, { "text": "1)" }] }
            }]
        });
        assert_eq!(GeminiBackend::parse_response(&json).unwrap(), "print(1)");
    }

    #[test]
    fn empty_candidates_are_a_parse_error() {
        let json = serde_json::json!({ "candidates": [] });
        assert!(matches!(
            GeminiBackend::parse_response(&json),
            Err(BackendError::Parse(_))
        ));
    }

    #[test]
    fn missing_key_reads_as_unconfigured() {
        assert!(!unconfigured().is_configured());
    }

    #[tokio::test]
    async fn generate_without_a_key_fails_before_any_network() {
        let err = unconfigured().generate("prompt").await.unwrap_err();
        assert!(matches!(err, BackendError::Auth(_)));
    }
}
