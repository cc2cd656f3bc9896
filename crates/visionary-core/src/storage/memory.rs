//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let value = value.to_string();
        Box::pin(async move {
            self.values.write().map_err(lock_error)?.insert(key, value);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<String>> {
        let key = key.to_string();
        Box::pin(async move {
            let values = self.values.read().map_err(lock_error)?;
            values.get(&key).cloned().ok_or(StorageError::NotFound(key))
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            self.values.write().map_err(lock_error)?.remove(&key);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let values = self.values.read().map_err(lock_error)?;
            Ok(values.keys().cloned().collect())
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let key = key.to_string();
        Box::pin(async move {
            let values = self.values.read().map_err(lock_error)?;
            Ok(values.contains_key(&key))
        })
    }
}
