//! Key-value persistence
//!
//! Features:
//! - `KeyValueStore` trait so game data can be saved without caring where
//! - LocalStorage backend (wasm32)
//! - In-memory backend (native builds and tests)
//! - JSON helpers that report corruption as an error instead of panicking

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Error type for storage operations
#[derive(Debug)]
pub enum PersistenceError {
    /// No storage backend available (private browsing, no window, etc.)
    Unavailable,
    /// Backend call failed
    Backend(String),
    /// Stored value could not be parsed
    Corrupt(serde_json::Error),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Unavailable => write!(f, "Storage unavailable"),
            PersistenceError::Backend(msg) => write!(f, "Storage backend error: {}", msg),
            PersistenceError::Corrupt(err) => write!(f, "Stored value is corrupt: {}", err),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Corrupt(err) => Some(err),
            PersistenceError::Unavailable => None,
            PersistenceError::Backend(_) => None,
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Corrupt(err)
    }
}

/// String key-value storage
pub trait KeyValueStore {
    /// Read a value; `Ok(None)` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    /// Remove a value (absent keys are not an error)
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// Read and deserialize a JSON value
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, PersistenceError> {
    match store.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Serialize and write a JSON value
pub fn save_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistenceError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// In-memory store used natively and in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// Open the window's LocalStorage
    pub fn open() -> Result<Self, PersistenceError> {
        let storage = web_sys::window()
            .ok_or(PersistenceError::Unavailable)?
            .local_storage()
            .map_err(|e| PersistenceError::Backend(format!("{:?}", e)))?
            .ok_or(PersistenceError::Unavailable)?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.storage
            .get_item(key)
            .map_err(|e| PersistenceError::Backend(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| PersistenceError::Backend(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.storage
            .remove_item(key)
            .map_err(|e| PersistenceError::Backend(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_load_json_reports_corruption() {
        let store = MemoryStore::new();
        store.set("bad", "{not json").unwrap();
        let result: Result<Option<Vec<u32>>, _> = load_json(&store, "bad");
        assert!(matches!(result, Err(PersistenceError::Corrupt(_))));

        let absent: Option<Vec<u32>> = load_json(&store, "missing").unwrap();
        assert!(absent.is_none());
    }

    #[test]
    fn test_error_display() {
        let err = PersistenceError::Backend("quota".to_string());
        assert_eq!(err.to_string(), "Storage backend error: quota");
        assert_eq!(PersistenceError::Unavailable.to_string(), "Storage unavailable");
    }
}
