use super::{GenerationClient, GenerationError, build_http_client};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// Generation client for the hosted Gemini `generateContent` API.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Build a client for `model`, optionally pointing at a non-default API base URL.
    pub fn new(
        base_url: Option<String>,
        api_key: String,
        model: String,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            http: build_http_client("plainly/generate")?,
            base_url: base_url.unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string()),
            api_key,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                GenerationError::Unavailable(format!(
                    "failed to reach Gemini at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Rejected { status, message });
        }

        let body: GenerateContentResponse = response.json().await.map_err(|error| {
            GenerationError::InvalidResponse(format!("failed to decode Gemini response: {error}"))
        })?;

        let candidate = body.candidates.into_iter().next().ok_or_else(|| {
            GenerationError::InvalidResponse("Gemini returned no candidates".into())
        })?;
        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerationError::InvalidResponse(format!(
                "Gemini candidate carried no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}
