use std::{future::Future, pin::Pin, sync::Arc};

use anyhow::{Context, Result};
use codegen_core::{build_instruction, normalize_response, GenerationError, GenerationRequest};

use crate::config::{AppConfig, ProviderKind};

pub mod gemini_client;
pub mod openai_client;

pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;

/// One call to an external text-completion service.
pub trait CompletionProvider: Send + Sync {
    fn complete<'a>(&'a self, instruction: &'a str) -> CompletionFuture<'a>;
}

#[derive(Clone)]
pub struct CodeGenerator {
    provider: Arc<dyn CompletionProvider>,
}

impl CodeGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub async fn generate_code(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let instruction = build_instruction(request.prompt(), request.language().id);
        let raw = self.provider.complete(&instruction).await?;
        normalize_response(&raw)
    }
}

pub fn build_http_client(config: &AppConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().context("failed to build http client")
}

pub fn build_code_generator(http_client: reqwest::Client, config: &AppConfig) -> CodeGenerator {
    let provider: Arc<dyn CompletionProvider> = match config.provider {
        ProviderKind::Gemini => Arc::new(gemini_client::GeminiClient::with_config(
            http_client,
            config.api_key.clone(),
            config.base_url.clone(),
            config.model.clone(),
        )),
        ProviderKind::Openai => Arc::new(openai_client::OpenAiCompatClient::with_config(
            http_client,
            config.api_key.clone(),
            config.base_url.clone(),
            config.model.clone(),
        )),
    };

    CodeGenerator::new(provider)
}

/// Pulls a human-readable message out of a provider error body.
///
/// Both supported providers wrap failures as `{"error": {"message": ...}}`.
pub(crate) fn provider_error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() {
                format!("request failed with status {status}")
            } else {
                format!("request failed with status {status}: {body}")
            }
        })
}
