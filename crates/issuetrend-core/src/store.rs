// SPDX-License-Identifier: Apache-2.0

//! Persisted session state.
//!
//! A small string key-value map that survives between runs. Front ends call
//! [`FileStore::load`] at startup and [`FileStore::save`] at shutdown; nothing
//! is written in between.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::config::data_dir;
use crate::error::IssueTrendError;

/// Key of the last successfully fetched repository reference.
pub const STORE_KEY_REPOSITORY: &str = "repository";

/// Key of the last selection mode.
pub const STORE_KEY_MODE: &str = "mode";

/// String key-value persistence.
pub trait KeyValueStore {
    /// Value under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Sets `key` to `value`.
    fn set(&mut self, key: &str, value: String);

    /// Removes `key`.
    fn remove(&mut self, key: &str);
}

/// In-memory store, used in tests and when persistence is disabled.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Store backed by a JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

/// Returns the default state file path.
#[must_use]
pub fn state_file_path() -> PathBuf {
    data_dir().join("state.json")
}

fn store_error(action: &str, path: &Path, err: impl std::fmt::Display) -> IssueTrendError {
    IssueTrendError::Store {
        message: format!("Failed to {action} {}: {err}", path.display()),
    }
}

impl FileStore {
    /// Loads the store from `path`. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns `IssueTrendError::Store` if the file exists but cannot be read
    /// or is not a JSON object of strings.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, IssueTrendError> {
        let values = if path.exists() {
            let contents =
                fs::read_to_string(path).map_err(|e| store_error("read", path, e))?;
            serde_json::from_str(&contents).map_err(|e| store_error("parse", path, e))?
        } else {
            BTreeMap::new()
        };

        debug!(entries = values.len(), "Loaded state store");
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    /// Loads the store from [`state_file_path`].
    ///
    /// # Errors
    ///
    /// See [`FileStore::load`].
    pub fn load_default() -> Result<Self, IssueTrendError> {
        Self::load(&state_file_path())
    }

    /// Writes the store to its file via a temp file and rename.
    ///
    /// # Errors
    ///
    /// Returns `IssueTrendError::Store` if the file cannot be written.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn save(&self) -> Result<(), IssueTrendError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| store_error("create", parent, e))?;
        }

        let contents = serde_json::to_string_pretty(&self.values)
            .map_err(|e| store_error("serialize", &self.path, e))?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, contents).map_err(|e| store_error("write", &temp_path, e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| store_error("rename", &self.path, e))?;

        debug!(entries = self.values.len(), "Saved state store");
        Ok(())
    }

    /// File this store is persisted to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}
