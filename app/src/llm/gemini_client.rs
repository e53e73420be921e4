use codegen_core::{GenerationError, SamplingConfig, SAMPLING};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{provider_error_message, CompletionFuture, CompletionProvider};

#[derive(Clone)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn with_config(
        http_client: reqwest::Client,
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            api_key,
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl CompletionProvider for GeminiClient {
    fn complete<'a>(&'a self, instruction: &'a str) -> CompletionFuture<'a> {
        Box::pin(async move {
            let Some(api_key) = self.api_key.as_deref() else {
                return Err(GenerationError::MissingCredential);
            };

            let payload = GeminiRequest::new(instruction, SAMPLING);
            debug!(model = %self.model, "calling Gemini generateContent");

            let response = self
                .http_client
                .post(self.endpoint())
                .header("x-goog-api-key", api_key)
                .header("content-type", "application/json")
                .json(&payload)
                .send()
                .await
                .map_err(|error| GenerationError::Transport(error.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GenerationError::Provider(provider_error_message(status, &body)));
            }

            let body: GeminiResponse = response.json().await.map_err(|error| {
                GenerationError::Transport(format!("failed to parse Gemini response: {error}"))
            })?;

            Ok(body.text())
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: SamplingConfig,
}

impl GeminiRequest {
    fn new(instruction: &str, sampling: SamplingConfig) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(instruction.to_string()),
                }],
            }],
            generation_config: sampling,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

impl GeminiResponse {
    /// Text parts of the first candidate, concatenated in order.
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
