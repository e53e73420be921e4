use anyhow::Result;
use tracing::{debug, warn};

use crate::config::{AppConfig, ProviderKind};

pub mod keychain;

use keychain::KeychainStore;

pub const KEYCHAIN_SERVICE: &str = "dev.codegen-assistant";

#[derive(Clone)]
pub struct SecretService {
    store: KeychainStore,
}

impl SecretService {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            store: KeychainStore::new(service_name),
        }
    }

    pub fn save_api_key(&self, provider: ProviderKind, api_key: &str) -> Result<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            anyhow::bail!("apiKey cannot be empty");
        }
        self.store.save_api_key(provider, api_key)
    }

    pub fn get_api_key(&self, provider: ProviderKind) -> Result<Option<String>> {
        self.store.get_api_key(provider)
    }

    pub fn delete_api_key(&self, provider: ProviderKind) -> Result<bool> {
        self.store.delete_api_key(provider)
    }

    /// Fills in the credential from the keychain when the environment had none.
    ///
    /// Keychain failures are logged and leave the config untouched; the
    /// completion client reports the missing key when a request is made.
    pub fn resolve_credential(&self, mut config: AppConfig) -> AppConfig {
        if config.has_credential() {
            return config;
        }

        match self.get_api_key(config.provider) {
            Ok(Some(key)) => {
                debug!(provider = config.provider.as_key(), "using api key from keychain");
                config.api_key = Some(key);
            }
            Ok(None) => {}
            Err(error) => {
                warn!(provider = config.provider.as_key(), "keychain lookup failed: {error}");
            }
        }
        config
    }
}
