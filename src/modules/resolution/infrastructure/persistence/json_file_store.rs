use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::modules::resolution::domain::repositories::KeyValueStore;
use crate::shared::{
    errors::{AppError, AppResult},
    utils::logger::LogContext,
};

/// Key-value store persisted as one JSON object on disk.
///
/// The whole file is read once on open and rewritten on every change through
/// a temporary file and a rename, so a crash never leaves a half-written
/// file behind.
pub struct JsonFileKeyValueStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileKeyValueStore {
    /// Open the store at `path`. A missing file starts empty; an unreadable
    /// or corrupt one is logged and ignored until the next write replaces it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = Self::read_file(&path);
        log::debug!("Opened key-value store {} ({} keys)", path.display(), values.len());

        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> BTreeMap<String, String> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                LogContext::error_with_context(&e, &format!("Failed to read {}", path.display()));
                return BTreeMap::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::error!("Ignoring corrupt key-value file {}: {}", path.display(), e);
            BTreeMap::new()
        })
    }

    fn values(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let serialized = serde_json::to_string_pretty(values)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized)?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            AppError::StorageError(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Apply `change` and write the result; memory is left untouched when
    /// the write fails
    fn update<F>(&self, change: F) -> AppResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut values = self.values();
        let mut next = values.clone();
        change(&mut next);
        if next == *values {
            return Ok(());
        }

        self.persist(&next)?;
        *values = next;
        Ok(())
    }
}

impl KeyValueStore for JsonFileKeyValueStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.update(|values| {
            values.remove(key);
        })
    }
}
