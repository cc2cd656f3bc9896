//! Browser localStorage implementation for WebAssembly.

use super::{BoxFuture, Storage, StorageError, StorageResult};

/// Storage backed by `window.localStorage`.
///
/// Not Send/Sync; WASM is single-threaded.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Acquire the window's localStorage.
    pub fn new() -> StorageResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Other("No window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Other(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Other("localStorage not available".to_string()))?;
        Ok(Self { storage })
    }
}

impl Storage for LocalStorage {
    fn save(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let result = self
            .storage
            .set_item(key, value)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {:?}", key, e)));
        Box::pin(async move { result })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<String>> {
        let result = match self.storage.get_item(key) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(StorageError::Io(format!("Failed to read {}: {:?}", key, e))),
        };
        Box::pin(async move { result })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let result = self
            .storage
            .remove_item(key)
            .map_err(|e| StorageError::Io(format!("Failed to delete {}: {:?}", key, e)));
        Box::pin(async move { result })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let result = (|| {
            let len = self
                .storage
                .length()
                .map_err(|e| StorageError::Io(format!("Failed to list keys: {:?}", e)))?;
            let mut keys = Vec::with_capacity(len as usize);
            for index in 0..len {
                if let Ok(Some(key)) = self.storage.key(index) {
                    keys.push(key);
                }
            }
            Ok(keys)
        })();
        Box::pin(async move { result })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let result = self
            .storage
            .get_item(key)
            .map(|value| value.is_some())
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {:?}", key, e)));
        Box::pin(async move { result })
    }
}
