//! Process-wide settings, read once at startup.
//!
//! The credential is optional here. A missing key is reported by the
//! completion client on each request, not at boot.

use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-04-17";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Gemini,
    Openai,
}

impl ProviderKind {
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Openai => "openai",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "openai" => Some(Self::Openai),
            _ => None,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => DEFAULT_GEMINI_MODEL,
            Self::Openai => DEFAULT_OPENAI_MODEL,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Gemini => DEFAULT_GEMINI_BASE_URL,
            Self::Openai => DEFAULT_OPENAI_BASE_URL,
        }
    }

    /// Environment variables holding a key for this provider, in priority order.
    fn credential_vars(&self) -> &'static [&'static str] {
        match self {
            Self::Gemini => &["GEMINI_API_KEY", "API_KEY"],
            Self::Openai => &["OPENAI_API_KEY", "API_KEY"],
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    /// Unset means the request may take as long as the provider does.
    pub request_timeout: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| non_empty(&lookup, name);

        let provider = var("CODEGEN_PROVIDER")
            .and_then(|value| ProviderKind::parse(&value))
            .unwrap_or_default();

        let api_key = credential_for(provider, &lookup);

        Self {
            provider,
            model: var("CODEGEN_MODEL")
                .unwrap_or_else(|| provider.default_model().to_string()),
            base_url: var("CODEGEN_BASE_URL")
                .unwrap_or_else(|| provider.default_base_url().to_string()),
            api_key,
            request_timeout: var("CODEGEN_TIMEOUT_SECS")
                .and_then(|value| value.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }

    /// Switches provider, resetting model and base URL to that provider's defaults.
    pub fn with_provider(self, provider: ProviderKind) -> Self {
        self.with_provider_from(provider, |name| std::env::var(name).ok())
    }

    pub(crate) fn with_provider_from(
        mut self,
        provider: ProviderKind,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        if provider != self.provider {
            self.provider = provider;
            self.model = provider.default_model().to_string();
            self.base_url = provider.default_base_url().to_string();
            self.api_key = credential_for(provider, &lookup);
        }
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn credential_for(
    provider: ProviderKind,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    provider
        .credential_vars()
        .iter()
        .find_map(|name| non_empty(lookup, name))
}
