//! File-backed settings store — one JSON object, keyed by section.
//!
//! Every update rewrites the whole file so a crash never leaves a section
//! half-written. Unknown sections are preserved untouched.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub struct SettingsStore {
    path: PathBuf,
    sections: Mutex<Map<String, Value>>,
}

impl SettingsStore {
    /// Open the store at `path`. A missing file is an empty store; a corrupt
    /// one is logged and treated as empty so the app can still start.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let sections = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    log::warn!("[STORE] {} is not a settings object, starting empty", path.display());
                    Map::new()
                }
            },
            Err(_) => Map::new(),
        };
        log::debug!("[STORE] Opened {} ({} sections)", path.display(), sections.len());
        Self {
            path,
            sections: Mutex::new(sections),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Map<String, Value>> {
        // A poisoned map is still a valid map.
        self.sections.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Read a section. `None` when absent or when it no longer fits `T`.
    pub fn get_section<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.lock().get(key).cloned()?;
        match serde_json::from_value(value) {
            Ok(section) => Some(section),
            Err(e) => {
                log::warn!("[STORE] Section '{}' does not match its type: {}", key, e);
                None
            }
        }
    }

    /// Replace a section and persist immediately.
    pub fn update_section<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        let mut sections = self.lock();
        let mut updated = sections.clone();
        updated.insert(key.to_string(), value);
        // Memory follows the file: a failed write leaves both unchanged.
        self.persist(&updated)?;
        *sections = updated;
        log::info!("[STORE] Saved section '{}'", key);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Snapshot of every section.
    pub fn entries(&self) -> Map<String, Value> {
        self.lock().clone()
    }

    fn persist(&self, sections: &Map<String, Value>) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| Error::NotFound(self.path.clone()))?;
        std::fs::create_dir_all(dir)?;

        let content = serde_json::to_string_pretty(sections)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
