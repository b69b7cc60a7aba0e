//! # BankIQ Persistence Crate
//!
//! This crate keeps the user's selections (banks, indicators, months, toggles)
//! between sessions. It is injected into the comparison layer rather than
//! reached for as a global.
//!
//! ## Public API
//!
//! - `SelectionStore`: the key/value contract, in JSON values.
//! - `MemoryStore`: in-process store, the default and the test double.
//! - `JsonFileStore`: every key in one JSON object on disk.
//! - `read_persisted` / `write_persisted`: typed access with the fallback and
//!   fire-and-forget rules the rest of the application relies on.

pub mod error;
pub mod file;
pub mod memory;

pub use error::PersistenceError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// A keyed store of JSON values.
pub trait SelectionStore: Send + Sync {
    /// Returns the stored value, `Ok(None)` if the key was never written.
    fn read_value(&self, key: &str) -> Result<Option<Value>, PersistenceError>;

    fn write_value(&self, key: &str, value: Value) -> Result<(), PersistenceError>;
}

/// Reads `key` as a `T`, falling back to `default` when nothing usable is stored.
///
/// A missing key, an unreadable store, and a value of the wrong shape all
/// produce `default`; the latter two are logged, never returned.
pub fn read_persisted<T: DeserializeOwned>(store: &dyn SelectionStore, key: &str, default: T) -> T {
    match store.read_value(key) {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(key, error = %e, "Stored value has an unexpected shape, using default.");
                default
            }
        },
        Ok(None) => default,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read persisted value, using default.");
            default
        }
    }
}

/// Writes `value` under `key`. Failures are logged and dropped; callers do not wait on them.
pub fn write_persisted<T: Serialize>(store: &dyn SelectionStore, key: &str, value: &T) {
    let result = serde_json::to_value(value)
        .map_err(PersistenceError::from)
        .and_then(|json| store.write_value(key, json));

    if let Err(e) = result {
        tracing::warn!(key, error = %e, "Failed to persist value.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct BrokenStore;

    impl SelectionStore for BrokenStore {
        fn read_value(&self, _key: &str) -> Result<Option<Value>, PersistenceError> {
            Err(PersistenceError::Corrupt("not json".to_string()))
        }

        fn write_value(&self, _key: &str, _value: Value) -> Result<(), PersistenceError> {
            Err(PersistenceError::Corrupt("read-only".to_string()))
        }
    }

    #[test]
    fn missing_key_reads_default() {
        let store = MemoryStore::default();
        let months: Vec<String> = read_persisted(&store, "banks-from-month", vec!["2024-01".to_string()]);
        assert_eq!(months, vec!["2024-01".to_string()]);
    }

    #[test]
    fn wrong_shape_reads_default() {
        let store = MemoryStore::default();
        store.write_value("banks-show-dynamics", json!("yes please")).unwrap();
        assert!(read_persisted(&store, "banks-show-dynamics", true));
    }

    #[test]
    fn unreadable_store_reads_default_and_write_does_not_panic() {
        let store = BrokenStore;
        assert_eq!(read_persisted(&store, "banks-to-month", 7), 7);
        write_persisted(&store, "banks-to-month", &8);
    }

    #[test]
    fn typed_values_survive_a_write() {
        let store = MemoryStore::default();
        write_persisted(&store, "selected", &vec!["20202", "30102"]);
        let back: Vec<String> = read_persisted(&store, "selected", Vec::new());
        assert_eq!(back, vec!["20202", "30102"]);
    }
}
