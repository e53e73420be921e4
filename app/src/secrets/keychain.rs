use anyhow::Result;
use keyring::{Entry, Error as KeyringError};

use crate::config::ProviderKind;

#[derive(Clone)]
pub struct KeychainStore {
    service_name: String,
}

impl KeychainStore {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn save_api_key(&self, provider: ProviderKind, api_key: &str) -> Result<()> {
        let entry = self.entry(provider)?;
        entry.set_password(api_key)?;
        Ok(())
    }

    pub fn get_api_key(&self, provider: ProviderKind) -> Result<Option<String>> {
        let entry = self.entry(provider)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(KeyringError::NoEntry) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    pub fn delete_api_key(&self, provider: ProviderKind) -> Result<bool> {
        let entry = self.entry(provider)?;
        match entry.delete_credential() {
            Ok(()) => Ok(true),
            Err(KeyringError::NoEntry) => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    fn entry(&self, provider: ProviderKind) -> Result<Entry> {
        let account = format!("{}:api_key", provider.as_key());
        Entry::new(&self.service_name, &account)
            .map_err(|error| anyhow::anyhow!("keychain entry creation failed: {error}"))
    }
}
