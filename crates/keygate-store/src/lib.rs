//! `keygate-store` — Durable ciphertext-wrapper storage for KEYGATE.
//!
//! One overwritten `SQLite` slot per (namespace, key); the record is
//! the already-encrypted {ciphertext, IV} pair from `keygate-core`.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod db;
pub mod error;
pub mod records;

pub use db::StoreDb;
pub use error::StoreError;
pub use records::{delete, load, persist};
