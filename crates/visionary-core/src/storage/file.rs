//! File-based storage implementation for native platforms.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};

/// File-based storage for native platforms.
///
/// Each key is stored as one JSON file in the base directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Linux: `~/.local/share/visionary-studio/storage/`
    /// On Windows: `%LOCALAPPDATA%\visionary-studio\storage\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("visionary-studio").join("storage"))
    }

    /// File path for a key.
    fn value_path(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_key))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.value_path(key);
        let value = value.to_string();
        Box::pin(async move {
            fs::write(&path, value).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
            })
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<String>> {
        let path = self.value_path(key);
        let key = key.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(key));
            }
            fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
            })
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.value_path(key);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();
        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }
            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            Ok(entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
                .collect())
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.value_path(key);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("visionary.component-library", "[]")).unwrap();
        let loaded = block_on(storage.load("visionary.component-library")).unwrap();

        assert_eq!(loaded, "[]");
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_list() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("doc1", "{}")).unwrap();
        block_on(storage.save("doc2", "{}")).unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"doc1".to_string()));
        assert!(list.contains(&"doc2".to_string()));
    }

    #[test]
    fn test_file_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("test", "{}")).unwrap();
        assert!(block_on(storage.exists("test")).unwrap());

        block_on(storage.delete("test")).unwrap();
        assert!(!block_on(storage.exists("test")).unwrap());
        // Deleting again is fine
        block_on(storage.delete("test")).unwrap();
    }

    #[test]
    fn test_file_storage_sanitizes_key() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("test/doc:with*special", "x")).unwrap();

        assert_eq!(block_on(storage.load("test/doc:with*special")).unwrap(), "x");
        assert!(dir.path().join("test_doc_with_special.json").exists());
    }
}
