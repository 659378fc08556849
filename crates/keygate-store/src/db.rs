//! `SQLite` connection handling and migration runner.
//!
//! The store holds already-encrypted records (ciphertext plus IV), so
//! the database file itself is plain `SQLite` — confidentiality lives
//! in the AEAD layer, not here.

use std::fmt;
use std::path::Path;

use rusqlite::Connection;

use crate::error::StoreError;

/// Forward-only SQL migrations, applied in order.
/// Index 0 → version 1, index 1 → version 2, etc.
const MIGRATIONS: &[&str] = &["CREATE TABLE wrapper_records (
        namespace  TEXT NOT NULL,
        record_key TEXT NOT NULL,
        ciphertext BLOB NOT NULL,
        iv         BLOB NOT NULL,
        PRIMARY KEY (namespace, record_key)
    ) WITHOUT ROWID;"];

/// Handle to an open wrapper-record database.
///
/// Holds a [`rusqlite::Connection`] that has already been migrated.
/// All store I/O flows through this struct.
pub struct StoreDb {
    conn: Connection,
}

impl fmt::Debug for StoreDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoreDb")
    }
}

impl StoreDb {
    /// Open (or create) the record database at `path`.
    ///
    /// Enables WAL journal mode and runs any pending migrations.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Database`] for `SQLite` errors.
    /// - [`StoreError::Migration`] if a migration fails.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;

        let mut db = Self { conn };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (tests and throwaway sessions).
    ///
    /// # Errors
    ///
    /// - [`StoreError::Database`] for `SQLite` errors.
    /// - [`StoreError::Migration`] if a migration fails.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.run_migrations()?;
        Ok(db)
    }

    /// Returns a reference to the underlying [`rusqlite::Connection`].
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns the current schema version (`PRAGMA user_version`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the pragma query fails.
    pub fn schema_version(&self) -> Result<i32, StoreError> {
        let v: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        Ok(v)
    }

    /// Apply all pending migrations sequentially.
    ///
    /// Each migration runs in a transaction; `user_version` is bumped
    /// atomically on commit.
    fn run_migrations(&mut self) -> Result<(), StoreError> {
        let current = self.schema_version()?;

        for (idx, sql) in MIGRATIONS.iter().enumerate() {
            // Migration versions are 1-indexed: index 0 → version 1.
            let version = idx
                .checked_add(1)
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| StoreError::Migration("migration index overflow".into()))?;
            if version <= current {
                continue;
            }

            let tx = self.conn.transaction()?;
            tx.execute_batch(sql)
                .map_err(|e| StoreError::Migration(format!("migration {version} failed: {e}")))?;
            tx.pragma_update(None, "user_version", version)?;
            tx.commit()?;
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
