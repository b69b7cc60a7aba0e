use crate::{PersistenceError, SelectionStore};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// A process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().map(|values| values.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SelectionStore for MemoryStore {
    fn read_value(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        let values = self
            .values
            .lock()
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn write_value(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}
