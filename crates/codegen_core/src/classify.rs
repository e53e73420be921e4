use serde::Serialize;
use thiserror::Error;

const INVALID_CREDENTIAL_MARKER: &str = "API key not valid";
const QUOTA_MARKER: &str = "quota";
const GENERIC_PREFIX: &str = "Failed to generate code: ";

/// Failures raised between sending an instruction and holding usable code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("API key is not configured. Cannot generate code.")]
    MissingCredential,
    #[error("Received an empty response from the AI. Try rephrasing your prompt.")]
    EmptyResponse,
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Provider(String),
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    InvalidInput,
    MissingCredential,
    InvalidCredential,
    QuotaExceeded,
    EmptyResponse,
    Generic,
}

impl ErrorCategory {
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::MissingCredential => "MISSING_CREDENTIAL",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::EmptyResponse => "EMPTY_RESPONSE",
            Self::Generic => "GENERATION_FAILED",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedError {
    pub category: ErrorCategory,
    pub message: String,
}

impl ClassifiedError {
    fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

pub fn classify(error: &GenerationError) -> ClassifiedError {
    match error {
        GenerationError::MissingCredential => {
            ClassifiedError::new(ErrorCategory::MissingCredential, error.to_string())
        }
        GenerationError::EmptyResponse => {
            ClassifiedError::new(ErrorCategory::EmptyResponse, error.to_string())
        }
        GenerationError::Transport(message) | GenerationError::Provider(message) => {
            classify_message(message)
        }
    }
}

/// Substring rules over provider error text, checked in order.
pub fn classify_message(message: &str) -> ClassifiedError {
    if message.contains(INVALID_CREDENTIAL_MARKER) {
        return ClassifiedError::new(
            ErrorCategory::InvalidCredential,
            "The provided API key is not valid. Please check your configuration.",
        );
    }

    if message.contains(QUOTA_MARKER) {
        return ClassifiedError::new(
            ErrorCategory::QuotaExceeded,
            "You have exceeded your API quota. Please check your usage limits.",
        );
    }

    ClassifiedError::new(ErrorCategory::Generic, format!("{GENERIC_PREFIX}{message}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_key_message_is_a_credential_error() {
        let classified = classify(&GenerationError::Provider("API key not valid".to_string()));
        assert_eq!(classified.category, ErrorCategory::InvalidCredential);
    }

    #[test]
    fn quota_message_is_a_quota_error() {
        let classified = classify_message("Request exceeded quota limit");
        assert_eq!(classified.category, ErrorCategory::QuotaExceeded);
    }

    #[test]
    fn credential_rule_wins_over_quota_rule() {
        let classified = classify_message("API key not valid; quota unknown");
        assert_eq!(classified.category, ErrorCategory::InvalidCredential);
    }

    #[test]
    fn other_messages_are_prefixed() {
        let classified = classify(&GenerationError::Transport("connection reset".to_string()));
        assert_eq!(classified.category, ErrorCategory::Generic);
        assert_eq!(classified.message, "Failed to generate code: connection reset");
    }

    #[test]
    fn typed_failures_map_directly() {
        assert_eq!(
            classify(&GenerationError::MissingCredential).category,
            ErrorCategory::MissingCredential
        );
        let empty = classify(&GenerationError::EmptyResponse);
        assert_eq!(empty.category, ErrorCategory::EmptyResponse);
        assert!(empty.message.contains("empty response"));
    }
}
