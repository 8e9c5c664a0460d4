//! Database layer for bankroll.
//!
//! Provides a `Database` struct that owns the SQLite connection and exposes
//! a small key-value table. The session collection lives under a single key
//! as one serialized blob.

mod kv;

pub use kv::KeyValues;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The main database struct that owns the SQLite connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the default location.
    ///
    /// The default location is `~/.local/share/bankroll/bankroll.db`.
    pub fn open() -> Result<Self, rusqlite::Error> {
        let db_path = Self::default_path();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        Self::open_at(&db_path)
    }

    /// Open or create a database at a specific path.
    pub fn open_at(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// A private in-memory database, discarded on drop.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// `bankroll.db` under the platform's local data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bankroll")
            .join("bankroll.db")
    }

    /// Access the key-value store. Recovers the connection from a poisoned lock.
    pub fn kv(&self) -> KeyValues<'_> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        KeyValues::new(conn)
    }

    /// Initialize the database schema.
    fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let db = Database::open_in_memory().unwrap();

        db.kv().set("poker_sessions", "[]").unwrap();

        let value = db.kv().get("poker_sessions").unwrap();
        assert_eq!(value, Some("[]".to_string()));
    }

    #[test]
    fn test_get_missing_key() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.kv().get("nope").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let db = Database::open_in_memory().unwrap();

        db.kv().set("k", "first").unwrap();
        db.kv().set("k", "second").unwrap();

        assert_eq!(db.kv().get("k").unwrap(), Some("second".to_string()));
    }

    #[test]
    fn test_remove() {
        let db = Database::open_in_memory().unwrap();

        db.kv().set("k", "v").unwrap();
        assert!(db.kv().remove("k").unwrap());
        assert_eq!(db.kv().get("k").unwrap(), None);

        // Removing again returns false
        assert!(!db.kv().remove("k").unwrap());
    }

    #[test]
    fn test_open_at_persists_across_connections() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bankroll.db");

        {
            let db = Database::open_at(&path).unwrap();
            db.kv().set("poker_sessions", r#"[{"id":"1"}]"#).unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        assert_eq!(
            db.kv().get("poker_sessions").unwrap(),
            Some(r#"[{"id":"1"}]"#.to_string())
        );
    }
}
