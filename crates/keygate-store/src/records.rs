//! Wrapper record CRUD — one overwritten slot per (namespace, key).
//!
//! The ciphertext and IV are stored as two separately addressable BLOB
//! columns of a single row, so a store/load round trip is byte-exact
//! for both fields. `persist` is a single upsert statement: a reader
//! never observes a partially written record.

use keygate_core::{CiphertextWrapper, SecretStoreError, IV_LEN};
use rusqlite::{params, OptionalExtension};

use crate::db::StoreDb;
use crate::error::StoreError;

/// Persist `wrapper` under `(namespace, key)`, overwriting any prior
/// record at that slot.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the write fails.
pub fn persist(
    db: &StoreDb,
    namespace: &str,
    key: &str,
    wrapper: &CiphertextWrapper,
) -> Result<(), StoreError> {
    db.connection().execute(
        "INSERT INTO wrapper_records (namespace, record_key, ciphertext, iv)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (namespace, record_key)
         DO UPDATE SET ciphertext = excluded.ciphertext, iv = excluded.iv",
        params![namespace, key, wrapper.ciphertext, wrapper.iv.as_slice()],
    )?;
    Ok(())
}

/// Load the wrapper stored under `(namespace, key)`.
///
/// A never-written slot returns `Ok(None)` — absence of enrollment is
/// a normal, expected state, not an error.
///
/// # Errors
///
/// - [`StoreError::Database`] if the read fails.
/// - [`StoreError::Core`] (codec) if the stored IV has the wrong
///   length — a corrupt record, never a silent wrong answer.
pub fn load(
    db: &StoreDb,
    namespace: &str,
    key: &str,
) -> Result<Option<CiphertextWrapper>, StoreError> {
    let row: Option<(Vec<u8>, Vec<u8>)> = db
        .connection()
        .query_row(
            "SELECT ciphertext, iv FROM wrapper_records
             WHERE namespace = ?1 AND record_key = ?2",
            params![namespace, key],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((ciphertext, iv_bytes)) = row else {
        return Ok(None);
    };

    if iv_bytes.len() != IV_LEN {
        return Err(StoreError::Core(SecretStoreError::Codec(format!(
            "stored IV has {} bytes (expected {IV_LEN})",
            iv_bytes.len()
        ))));
    }
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&iv_bytes);

    Ok(Some(CiphertextWrapper { ciphertext, iv }))
}

/// Delete the record at `(namespace, key)`, if any. Idempotent.
///
/// Returns `true` if a record was removed.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the delete fails.
pub fn delete(db: &StoreDb, namespace: &str, key: &str) -> Result<bool, StoreError> {
    let removed = db.connection().execute(
        "DELETE FROM wrapper_records WHERE namespace = ?1 AND record_key = ?2",
        params![namespace, key],
    )?;
    Ok(removed > 0)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
