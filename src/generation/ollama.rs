use super::{GenerationClient, GenerationError, build_http_client};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Generation client backed by a local Ollama runtime.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Build a client for `base_url` (defaults to the local runtime) and `model`.
    pub fn new(base_url: Option<String>, model: String) -> Result<Self, GenerationError> {
        Ok(Self {
            http: build_http_client("plainly/generate")?,
            base_url: base_url.unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl GenerationClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": 0.2,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                GenerationError::Unavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GenerationError::Unavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Rejected { status, message });
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            GenerationError::InvalidResponse(format!("failed to decode Ollama response: {error}"))
        })?;

        if !body.done {
            return Err(GenerationError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response)
    }
}
