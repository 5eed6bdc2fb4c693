//! Local key-value blob storage.
//!
//! # Responsibility
//! - Define the storage seam the saved-record store is written against.
//! - Provide a SQLite-backed and an in-memory implementation.
//!
//! # Invariants
//! - Values are opaque text; encoding is the caller's concern.
//! - `get_item` on an absent key returns `Ok(None)`, never an error.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

pub type KvResult<T> = Result<T, KvError>;

/// Storage-level failure.
#[derive(Debug)]
pub enum KvError {
    Db(DbError),
    /// Connection is not migrated to the schema this build expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Backend cannot serve requests (for example a poisoned lock).
    Unavailable(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "key-value store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::Unavailable(message) => write!(f, "key-value store unavailable: {message}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistent string-to-string storage addressed by key.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> KvResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> KvResult<()>;
    fn remove_item(&self, key: &str) -> KvResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_item(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> KvResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> KvResult<()> {
        (**self).remove_item(key)
    }
}
