//! Key-value persistence
//!
//! Values are opaque strings stored under short string keys. The file-backed
//! store keeps one `<key>.json` file per key inside the data directory.

use super::files::{atomic_write, read_file, remove_file};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),
    #[error("store access failed for {key}: {message}")]
    Backend { key: String, message: String },
}

/// String key-value storage that survives process restart
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Directory-backed store used in production
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

fn backend_error(key: &str, err: anyhow::Error) -> StoreError {
    StoreError::Backend {
        key: key.to_string(),
        message: format!("{:#}", err),
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        read_file(path).map_err(|e| backend_error(key, e))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        atomic_write(path, value).map_err(|e| backend_error(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        remove_file(path).map_err(|e| backend_error(key, e))
    }
}

#[cfg(test)]
pub use memory::{FailingStore, MemoryStore};
