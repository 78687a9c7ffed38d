use std::collections::HashMap;
use std::sync::Mutex;

use keyring::Entry;
use thiserror::Error;

use crate::constants::KEYRING_SERVICE;

/// Errors raised by secret store backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// No secret is stored under the requested key
    #[error("no secret stored under key `{0}`")]
    NotFound(String),
    /// The backend failed for any other reason
    #[error("secret store backend error: {0}")]
    Backend(String),
}

/// A secret together with the key and label it is stored under
#[derive(Debug, Clone)]
pub struct Item {
    pub key: String,
    pub data: Vec<u8>,
    /// Human-readable label shown by OS keychain UIs
    pub label: String,
}

impl Item {
    pub fn new(key: impl Into<String>, data: Vec<u8>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            data,
            label: label.into(),
        }
    }
}

/// Backend-agnostic secret storage
///
/// Implementations must report a missing key as [`StoreError::NotFound`]
/// so callers can tell "never registered" apart from backend failures.
pub trait SecretStore {
    /// Read the secret stored under `key`
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Write `item`, replacing any existing secret under the same key
    fn set(&self, item: Item) -> Result<(), StoreError>;
}

/// Secret store backed by the OS keychain
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    /// Create a store using the default service name
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, StoreError> {
        Entry::new(&self.service, key).map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        match self.entry(key)?.get_secret() {
            Ok(data) => Ok(data),
            Err(keyring::Error::NoEntry) => Err(StoreError::NotFound(key.to_string())),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }

    fn set(&self, item: Item) -> Result<(), StoreError> {
        // The keyring crate has no label concept; the key doubles as one.
        self.entry(&item.key)?
            .set_secret(&item.data)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

/// In-memory secret store for tests and ephemeral use
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let items = self
            .items
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".to_string()))?;
        items
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn set(&self, item: Item) -> Result<(), StoreError> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".to_string()))?;
        items.insert(item.key, item.data);
        Ok(())
    }
}
