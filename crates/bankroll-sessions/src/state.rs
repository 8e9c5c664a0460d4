//! In-memory view of the session collection for interactive consumers.

use std::collections::BTreeSet;

use crate::backend::KeyValueStore;
use crate::draft::SessionDraft;
use crate::error::StorageError;
use crate::filter::{self, FilterCriteria, FilterField};
use crate::stats::Stats;
use crate::store::SessionStore;
use crate::types::SessionRecord;
use crate::update::SessionUpdate;

/// Holds the loaded sessions and the active filter on top of a
/// [`SessionStore`].
///
/// The store stays the source of truth. Mutations go through it first and
/// the local copy is patched from the returned values; [`refresh`] reloads
/// everything.
///
/// [`refresh`]: SessionsState::refresh
pub struct SessionsState<B> {
    store: SessionStore<B>,
    sessions: Vec<SessionRecord>,
    filters: FilterCriteria,
    last_error: Option<String>,
}

impl<B: KeyValueStore> SessionsState<B> {
    /// Wrap `store` and load its sessions.
    pub fn new(store: SessionStore<B>) -> Self {
        let mut state = Self {
            store,
            sessions: Vec::new(),
            filters: FilterCriteria::default(),
            last_error: None,
        };
        if let Err(e) = state.refresh() {
            tracing::debug!("Starting with an empty session list: {}", e);
        }
        state
    }

    pub fn store(&self) -> &SessionStore<B> {
        &self.store
    }

    /// Reload every session from the store.
    pub fn refresh(&mut self) -> Result<(), StorageError> {
        self.last_error = None;
        match self.store.load() {
            Ok(sessions) => {
                self.sessions = sessions;
                Ok(())
            }
            Err(e) => {
                self.sessions.clear();
                Err(self.fail("Failed to load sessions", e))
            }
        }
    }

    /// Every loaded session, most recent first.
    pub fn all_sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    /// Loaded sessions narrowed by the active filter.
    pub fn filtered_sessions(&self) -> Vec<SessionRecord> {
        filter::apply(&self.sessions, &self.filters)
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    pub fn apply_filters(&mut self, filters: FilterCriteria) {
        self.filters = filters;
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterCriteria::default();
    }

    /// Values available for a filter picker, drawn from every loaded session.
    pub fn available_values(&self, field: FilterField) -> BTreeSet<String> {
        filter::available_values(&self.sessions, field)
    }

    /// Message from the most recent failed operation.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn add_session(&mut self, draft: SessionDraft) -> Result<SessionRecord, StorageError> {
        self.last_error = None;
        match self.store.save(draft) {
            Ok(record) => {
                self.sessions.insert(0, record.clone());
                Ok(record)
            }
            Err(e) => Err(self.fail("Failed to save session", e)),
        }
    }

    pub fn update_session(
        &mut self,
        id: &str,
        update: &SessionUpdate,
    ) -> Result<SessionRecord, StorageError> {
        self.last_error = None;
        match self.store.update(id, update) {
            Ok(record) => {
                if let Some(slot) = self.sessions.iter_mut().find(|s| s.id == id) {
                    *slot = record.clone();
                }
                Ok(record)
            }
            Err(e) => Err(self.fail("Failed to update session", e)),
        }
    }

    pub fn delete_session(&mut self, id: &str) -> Result<bool, StorageError> {
        self.last_error = None;
        match self.store.delete(id) {
            Ok(removed) => {
                self.sessions.retain(|s| s.id != id);
                Ok(removed)
            }
            Err(e) => Err(self.fail("Failed to delete session", e)),
        }
    }

    pub fn clear_all(&mut self) -> Result<(), StorageError> {
        self.last_error = None;
        match self.store.clear_all() {
            Ok(()) => {
                self.sessions.clear();
                Ok(())
            }
            Err(e) => Err(self.fail("Failed to clear sessions", e)),
        }
    }

    /// Statistics over every stored session, regardless of the active filter.
    pub fn stats(&self) -> Stats {
        self.store.get_stats()
    }

    fn fail(&mut self, message: &str, error: StorageError) -> StorageError {
        tracing::error!("{}: {}", message, error);
        self.last_error = Some(message.to_string());
        error
    }
}
