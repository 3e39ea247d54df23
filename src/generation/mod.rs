//! Text-generation clients used for summaries and answers.
//!
//! The pipeline treats the generation service as an opaque `generate(prompt) -> text`
//! capability. Provider adapters issue HTTP requests directly with `reqwest`; the
//! [`ResilientClient`] decorator bounds each call with a timeout and retries transient failures.

mod gemini;
mod ollama;
mod resilient;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use resilient::{ResilientClient, RetryPolicy};

use crate::config::{Config, GenerationProvider};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by text-generation providers.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Provider could not be reached or the client could not be built.
    #[error("Generation provider unavailable: {0}")]
    Unavailable(String),
    /// Provider answered with a non-success status.
    #[error("Generation provider returned {status}: {message}")]
    Rejected {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Response body or diagnostic text.
        message: String,
    },
    /// Provider response could not be parsed or carried no text.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
    /// Provider did not answer within the configured bound.
    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),
}

impl GenerationError {
    /// Whether a retry has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::Timeout(_) => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse(_) => false,
        }
    }
}

/// Interface implemented by text-generation backends.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Produce a completion for the supplied prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Build the configured generation client wrapped with timeout and retry handling.
pub fn get_generation_client(
    config: &Config,
) -> Result<Arc<dyn GenerationClient>, GenerationError> {
    let inner: Arc<dyn GenerationClient> = match config.generation_provider {
        GenerationProvider::Gemini => {
            let api_key = config.gemini_api_key.clone().ok_or_else(|| {
                GenerationError::Unavailable("GEMINI_API_KEY is not configured".into())
            })?;
            Arc::new(GeminiClient::new(
                config.gemini_url.clone(),
                api_key,
                config.generation_model.clone(),
            )?)
        }
        GenerationProvider::Ollama => Arc::new(OllamaClient::new(
            config.ollama_url.clone(),
            config.generation_model.clone(),
        )?),
    };
    tracing::info!(
        provider = ?config.generation_provider,
        model = %config.generation_model,
        "Generation client initialized"
    );

    let policy = RetryPolicy {
        timeout: Duration::from_secs(config.generation_timeout_secs.max(1)),
        max_retries: config.generation_max_retries,
        initial_backoff: Duration::from_millis(500),
    };
    Ok(Arc::new(ResilientClient::new(inner, policy)))
}

fn build_http_client(user_agent: &str) -> Result<reqwest::Client, GenerationError> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(|error| {
            GenerationError::Unavailable(format!("failed to construct HTTP client: {error}"))
        })
}
