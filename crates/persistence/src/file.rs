use crate::{PersistenceError, SelectionStore};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Stores every key in a single JSON object file.
///
/// A missing file reads as empty. A corrupt file reads as an error (so callers
/// fall back to defaults) and is replaced wholesale on the next write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, PersistenceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            other => Err(PersistenceError::Corrupt(format!(
                "expected a JSON object in {}, found {}",
                self.path.display(),
                other
            ))),
        }
    }
}

impl SelectionStore for JsonFileStore {
    fn read_value(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn write_value(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;

        let mut map = self.load().unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Discarding unreadable selection store.");
            Map::new()
        });
        map.insert(key.to_string(), value);

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        // Written beside the target and renamed over it, so a reader sees the old
        // file or the new one, never a half-written one.
        let mut staged = NamedTempFile::new_in(parent)?;
        serde_json::to_writer_pretty(&mut staged, &Value::Object(map))?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
