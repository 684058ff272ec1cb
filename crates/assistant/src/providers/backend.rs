//! Backend trait and common types.

use async_trait::async_trait;

/// Error type for backend operations
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),
}

/// Explicit backend configuration, injected into whichever backend the
/// host constructs. There is no process-wide client state.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl BackendConfig {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            api_key,
            model: model.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Trait every generative-text backend implements.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Backend name for logging/display
    fn name(&self) -> &'static str;

    /// Whether this backend has the configuration it needs to make a call
    fn is_configured(&self) -> bool;

    /// Send one prompt and get the generated text back
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}
