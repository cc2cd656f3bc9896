//! Key/value persistence backends.
//!
//! The component library is the consumer. `list` and `exists` complete the
//! backend surface for hosts that inspect what has been stored.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

pub use crate::BoxFuture;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Key not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for string key/value storage backends.
///
/// Values are opaque strings; callers serialize their own records.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Load the value under `key`.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<String>>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all keys.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Trait for string key/value storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Load the value under `key`.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<String>>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all keys.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Platform default storage.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = FileStorage;

/// Platform default storage.
#[cfg(target_arch = "wasm32")]
pub type PlatformStorage = LocalStorage;

/// Create the platform default storage.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<PlatformStorage> {
    FileStorage::default_location()
}

/// Create the platform default storage.
#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> StorageResult<PlatformStorage> {
    LocalStorage::new()
}
