//! File-backed store.
//!
//! The whole store is one JSON object on disk, each key holding the
//! decoded JSON document so the file stays readable. Writes are buffered
//! until [`KeyValueStore::flush`] and land through a temporary file and a
//! rename.

use crate::error::{Error, Result};
use crate::store::KeyValueStore;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
    dirty: bool,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str::<Value>(&content)? {
                    Value::Object(map) => map,
                    _ => {
                        return Err(Error::Store(format!(
                            "{} does not contain a JSON object",
                            path.display()
                        )))
                    }
                }
            }
        } else {
            debug!("No data file at {}, starting empty", path.display());
            Map::new()
        };

        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;

        info!("Saved dashboard state to {}", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(Value::to_string))
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let parsed: Value = serde_json::from_str(&value)
            .map_err(|e| Error::Store(format!("value for {} is not JSON: {}", key, e)))?;
        self.entries.insert(key.to_string(), parsed);
        self.dirty = true;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.write()?;
            self.dirty = false;
        }
        Ok(())
    }
}
