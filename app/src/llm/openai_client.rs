use codegen_core::{GenerationError, SamplingConfig, SAMPLING};
use serde::Serialize;
use tracing::debug;

use super::{provider_error_message, CompletionFuture, CompletionProvider};

#[derive(Clone)]
pub struct OpenAiCompatClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAiCompatClient {
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
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl CompletionProvider for OpenAiCompatClient {
    fn complete<'a>(&'a self, instruction: &'a str) -> CompletionFuture<'a> {
        Box::pin(async move {
            let Some(api_key) = self.api_key.as_deref() else {
                return Err(GenerationError::MissingCredential);
            };

            let payload = OpenAiRequest::new(&self.model, instruction, SAMPLING);
            debug!(model = %self.model, "calling OpenAI-compatible chat completions");

            let response = self
                .http_client
                .post(self.endpoint())
                .header("authorization", format!("Bearer {api_key}"))
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

            let value: serde_json::Value = response.json().await.map_err(|error| {
                GenerationError::Transport(format!(
                    "failed to parse OpenAI-compatible response: {error}"
                ))
            })?;

            Ok(message_text(&value))
        })
    }
}

/// Content of the first choice, which is either a string or a list of text parts.
fn message_text(value: &serde_json::Value) -> String {
    let content = value
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"));

    match content {
        Some(serde_json::Value::String(single)) => single.clone(),
        Some(serde_json::Value::Array(parts)) => parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|text| text.as_str()))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    stream: bool,
    temperature: f32,
    top_p: f32,
}

impl OpenAiRequest {
    // top_k has no chat-completions counterpart and is not sent.
    fn new(model: &str, instruction: &str, sampling: SamplingConfig) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: instruction.to_string(),
            }],
            stream: false,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}
