use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::backend::KeyValueStore;
use crate::draft::SessionDraft;
use crate::error::StorageError;
use crate::stats::{compute_stats, Stats};
use crate::types::{SessionRecord, SESSIONS_KEY};
use crate::update::SessionUpdate;

/// Owns the persisted session collection.
///
/// The whole collection lives under one key as a JSON array, most recent
/// first. Every mutation reads the full collection, changes it, and writes
/// the full collection back.
pub struct SessionStore<B> {
    backend: B,
    write_lock: Mutex<()>,
}

impl<B: KeyValueStore> SessionStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load every session, surfacing read and parse failures.
    pub fn load(&self) -> Result<Vec<SessionRecord>, StorageError> {
        let raw = self
            .backend
            .get(SESSIONS_KEY)
            .map_err(StorageError::Read)?;

        match raw {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(StorageError::Corrupted),
        }
    }

    /// Load every session. Read failures are logged and treated as an empty
    /// collection; use [`SessionStore::load`] to observe them.
    pub fn get_all(&self) -> Vec<SessionRecord> {
        match self.load() {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!("Failed to read sessions, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Get a single session by ID.
    pub fn get(&self, id: &str) -> Result<Option<SessionRecord>, StorageError> {
        Ok(self.load()?.into_iter().find(|s| s.id == id))
    }

    /// Store a new session and return it.
    ///
    /// The draft is not validated here.
    pub fn save(&self, draft: SessionDraft) -> Result<SessionRecord, StorageError> {
        let _guard = self.lock();
        let mut sessions = self.load()?;

        let id = generate_id(&sessions);
        let record = draft.into_record(id);
        sessions.insert(0, record.clone());

        self.persist(&sessions)?;
        tracing::info!(id = %record.id, profit = record.profit, "Session saved");
        Ok(record)
    }

    /// Merge `update` onto the session with `id` and return the result.
    pub fn update(&self, id: &str, update: &SessionUpdate) -> Result<SessionRecord, StorageError> {
        let _guard = self.lock();
        let mut sessions = self.load()?;

        let record = sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        update.apply_to(record);
        let updated = record.clone();

        self.persist(&sessions)?;
        tracing::info!(id = %id, "Session updated");
        Ok(updated)
    }

    /// Delete a session by ID. Returns whether anything was removed; deleting
    /// an unknown ID changes nothing.
    pub fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let _guard = self.lock();
        let mut sessions = self.load()?;

        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        if sessions.len() == before {
            tracing::debug!(id = %id, "Delete of unknown session ignored");
            return Ok(false);
        }

        self.persist(&sessions)?;
        tracing::info!(id = %id, "Session deleted");
        Ok(true)
    }

    /// Remove the stored collection entirely.
    pub fn clear_all(&self) -> Result<(), StorageError> {
        let _guard = self.lock();
        self.backend
            .remove(SESSIONS_KEY)
            .map_err(StorageError::Write)?;
        tracing::info!("All sessions cleared");
        Ok(())
    }

    /// Aggregate statistics over every stored session, ignoring any filter.
    pub fn get_stats(&self) -> Stats {
        compute_stats(&self.get_all())
    }

    fn persist(&self, sessions: &[SessionRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_string(sessions).map_err(StorageError::Encode)?;
        self.backend
            .set(SESSIONS_KEY, &json)
            .map_err(StorageError::Write)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// `{unix_millis}-{8 hex}`, regenerated until it is unused.
fn generate_id(existing: &[SessionRecord]) -> String {
    loop {
        let uuid = Uuid::new_v4().simple().to_string();
        let id = format!("{}-{}", Utc::now().timestamp_millis(), &uuid[..8]);
        if !existing.iter().any(|s| s.id == id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use chrono::TimeZone;

    fn draft() -> SessionDraft {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap();
        let mut draft = SessionDraft::starting_at(start);
        draft.location = "Casino".to_string();
        draft.buy_in = 100.0;
        draft.cash_out = 150.0;
        draft
    }

    #[test]
    fn test_generate_id_format() {
        let id = generate_id(&[]);
        let (millis, suffix) = id.split_once('-').unwrap();

        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_empty_payload_is_empty_collection() {
        let backend = MemoryStore::new();
        backend.insert_raw(SESSIONS_KEY, "");
        let store = SessionStore::new(backend);

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_writes_whole_collection() {
        let store = SessionStore::new(MemoryStore::new());

        store.save(draft()).unwrap();
        store.save(draft()).unwrap();

        let raw = store.backend().raw(SESSIONS_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }
}
