//! Native storage implementation using the filesystem.
//!
//! Directory structure:
//! ~/.sanity/
//!   sanity.lastSession.json     # Most recent working session
//!   sanity.savedSessions.json   # Saved session list
//!   sanity.log                  # Log file (see `logging`)

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::platform::storage::{Storage, StorageError};

/// Native storage that keeps one JSON file per key under a data directory.
pub struct NativeStorage {
    root: PathBuf,
}

impl NativeStorage {
    /// Create a new native storage with the given root path.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create native storage with the default path (~/.sanity/).
    pub fn with_default_path() -> Self {
        Self::new(Self::default_path())
    }

    /// Get the default data directory path (~/.sanity/)
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sanity")
    }

    /// Get the root path of the storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl Storage for NativeStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.root)
            .map_err(|e| StorageError::Io(format!("Failed to create data directory: {}", e)))?;

        // Write beside the target and rename so readers never see a torn file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path)
            .map_err(|e| StorageError::Io(format!("Failed to replace {}: {}", path.display(), e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
