//! Key-value table access.

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::MutexGuard;

/// Key-value store with a borrowed connection.
pub struct KeyValues<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> KeyValues<'db> {
    /// Create a new KeyValues store with a borrowed connection.
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
    }

    /// Store `value` under `key` (insert or replace).
    pub fn set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;

        Ok(())
    }

    /// Delete a key. Returns whether a row was removed.
    pub fn remove(&self, key: &str) -> Result<bool, rusqlite::Error> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(rows_affected > 0)
    }
}
