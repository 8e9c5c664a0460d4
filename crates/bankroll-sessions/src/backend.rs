//! Key-value backends the session store can persist into.

use std::collections::HashMap;
use std::sync::Mutex;

use bankroll_db::Database;

use crate::error::BackendError;

/// A synchronous, process-local string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), BackendError>;
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.kv().get(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        Ok(self.kv().set(key, value)?)
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.kv().remove(key)?;
        Ok(())
    }
}

/// In-memory backend with an optional size quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any single value larger than `limit` bytes.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota: Some(limit),
        }
    }

    /// Seed a raw value, bypassing the quota.
    pub fn insert_raw(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    /// Read a raw value.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let entries = self.entries.lock().map_err(|_| BackendError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        if let Some(limit) = self.quota {
            if value.len() > limit {
                return Err(BackendError::QuotaExceeded {
                    needed: value.len(),
                    limit,
                });
            }
        }
        let mut entries = self.entries.lock().map_err(|_| BackendError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        let mut entries = self.entries.lock().map_err(|_| BackendError::Poisoned)?;
        entries.remove(key);
        Ok(())
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
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        store.remove("k").unwrap();
    }

    #[test]
    fn test_memory_store_quota() {
        let store = MemoryStore::with_quota(4);

        store.set("k", "1234").unwrap();
        let err = store.set("k", "12345").unwrap_err();
        assert!(matches!(
            err,
            BackendError::QuotaExceeded {
                needed: 5,
                limit: 4
            }
        ));
        assert_eq!(store.raw("k"), Some("1234".to_string()));
    }

    #[test]
    fn test_database_backend() {
        let db = Database::open_in_memory().unwrap();

        KeyValueStore::set(&db, "k", "v").unwrap();
        assert_eq!(KeyValueStore::get(&db, "k").unwrap(), Some("v".to_string()));
        KeyValueStore::remove(&db, "k").unwrap();
        KeyValueStore::remove(&db, "k").unwrap();
        assert_eq!(KeyValueStore::get(&db, "k").unwrap(), None);
    }
}
