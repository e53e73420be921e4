use chrono::{DateTime, Utc};
use codegen_core::{
    ErrorCategory, GenerationOutcome, InteractionState, LanguageOption, SUPPORTED_LANGUAGES,
};
use serde::Serialize;

use crate::config::{AppConfig, ProviderKind};

/// What the front-end needs to draw the form before the first submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapState {
    pub provider: ProviderKind,
    pub model: String,
    pub credential_configured: bool,
    pub languages: &'static [LanguageOption],
    pub state: InteractionState,
}

impl BootstrapState {
    pub fn new(config: &AppConfig, state: InteractionState) -> Self {
        Self {
            provider: config.provider,
            model: config.model.clone(),
            credential_configured: config.has_credential(),
            languages: SUPPORTED_LANGUAGES,
            state,
        }
    }
}

/// Raw provider failure behind a classified outcome, for the front-end's detail line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeErrorEvent {
    pub code: &'static str,
    pub message: String,
}

impl RuntimeErrorEvent {
    pub fn generation_failed(category: ErrorCategory, raw: String) -> Self {
        Self {
            code: category.as_code(),
            message: raw,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    StateChanged(InteractionState),
    RuntimeError(RuntimeErrorEvent),
}

/// Result of a one-shot `generate` run, printed as JSON with `--json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub prompt: String,
    pub language: String,
    pub provider: ProviderKind,
    pub model: String,
    pub outcome: GenerationOutcome,
    pub started_at: DateTime<Utc>,
    pub latency_ms: i64,
}
