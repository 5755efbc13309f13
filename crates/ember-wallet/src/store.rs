use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::WalletError;

/// Persistent key-value storage consumed by the vault.
///
/// The embedding platform supplies the real implementation (keychain,
/// encrypted preferences, a file); the wallet only needs these three
/// operations and stores opaque JSON strings.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, WalletError>;
    fn set(&self, key: &str, value: &str) -> Result<(), WalletError>;
    fn remove(&self, key: &str) -> Result<(), WalletError>;
}

/// In-memory [`KeyValueStore`], the default for tests and for hosts that
/// persist elsewhere.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, WalletError> {
        let map = self
            .inner
            .lock()
            .map_err(|e| WalletError::Storage(e.to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WalletError> {
        let mut map = self
            .inner
            .lock()
            .map_err(|e| WalletError::Storage(e.to_string()))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), WalletError> {
        let mut map = self
            .inner
            .lock()
            .map_err(|e| WalletError::Storage(e.to_string()))?;
        map.remove(key);
        Ok(())
    }
}
