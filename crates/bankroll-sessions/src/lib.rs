//! # bankroll-sessions
//!
//! Poker session records and everything derived from them.
//!
//! ## Key Types
//!
//! - [`SessionDraft`] - User input before it is stored
//! - [`SessionRecord`] - A stored session with derived fields
//! - [`SessionStore`] - Persists the collection into a [`KeyValueStore`]
//! - [`FilterCriteria`] - Narrows a session list
//! - [`Stats`] - Aggregate profit statistics
//! - [`SessionsState`] - Loaded sessions plus the active filter

pub mod backend;
pub mod draft;
pub mod error;
pub mod filter;
pub mod state;
pub mod stats;
pub mod store;
pub mod types;
pub mod update;

pub use backend::{KeyValueStore, MemoryStore};
pub use draft::{SessionDraft, GAME_PRESETS, LOCATION_PRESETS, STAKES_PRESETS};
pub use error::{BackendError, DraftIssue, StorageError, ValidationError};
pub use filter::{apply, available_values, DateRange, FilterCriteria, FilterField, KindFilter};
pub use state::SessionsState;
pub use stats::{bankroll_series, compute_stats, total_duration, BankrollPoint, Stats};
pub use store::SessionStore;
pub use types::{duration_label, SessionKind, SessionRecord, SESSIONS_KEY};
pub use update::SessionUpdate;
