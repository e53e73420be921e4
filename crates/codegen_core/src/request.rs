use serde::Serialize;
use thiserror::Error;

use crate::classify::{ClassifiedError, ErrorCategory};
use crate::languages::{find_language, LanguageOption};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Prompt cannot be empty.")]
    EmptyPrompt,
    #[error("unsupported language: {0}")]
    UnknownLanguage(String),
}

impl RequestError {
    pub fn into_outcome(self) -> GenerationOutcome {
        GenerationOutcome::Failure {
            category: ErrorCategory::InvalidInput,
            message: self.to_string(),
        }
    }
}

/// A validated submission. Built once on submit and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    language: &'static LanguageOption,
}

impl GenerationRequest {
    pub fn new(prompt: &str, language_id: &str) -> Result<Self, RequestError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(RequestError::EmptyPrompt);
        }

        let language = find_language(language_id)
            .ok_or_else(|| RequestError::UnknownLanguage(language_id.trim().to_string()))?;

        Ok(Self {
            prompt: prompt.to_string(),
            language,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn language(&self) -> &'static LanguageOption {
        self.language
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GenerationOutcome {
    Success { code: String },
    Failure { category: ErrorCategory, message: String },
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<ClassifiedError> for GenerationOutcome {
    fn from(error: ClassifiedError) -> Self {
        Self::Failure {
            category: error.category,
            message: error.message,
        }
    }
}
