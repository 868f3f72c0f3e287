//! Persistent key-value backends.
//!
//! # Responsibility
//! - Define the synchronous string-keyed, string-valued contract stores
//!   persist through.
//! - Provide an in-process backend and a durable SQLite backend.
//!
//! # Invariants
//! - Backends never interpret values; stores own the JSON encoding.
//! - Availability is checked with `is_available()` before first use.
//! - Every backend failure is a `StorageError`; backends never panic.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure raised while reading, encoding or writing persisted state.
#[derive(Debug)]
pub enum StorageError {
    /// Backend is not usable in the current execution context.
    Unavailable,
    /// Write rejected because the backend ran out of space.
    QuotaExceeded {
        key: String,
        required_bytes: u64,
        quota_bytes: u64,
    },
    /// Store state could not be serialized.
    Encode(serde_json::Error),
    /// Stored text could not be parsed into store state.
    Decode(serde_json::Error),
    Db(DbError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage backend is unavailable"),
            Self::QuotaExceeded {
                key,
                required_bytes,
                quota_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: {required_bytes} bytes needed, quota is {quota_bytes}"
            ),
            Self::Encode(err) => write!(f, "failed to encode stored state: {err}"),
            Self::Decode(err) => write!(f, "failed to decode stored state: {err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) | Self::Decode(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Unavailable | Self::QuotaExceeded { .. } => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous key-value store used for persisted state.
///
/// Methods take `&self` so one backend can be shared by several stores on a
/// single thread; implementations use interior mutability where needed.
pub trait KvBackend {
    /// Checks whether the backend can be used right now.
    fn is_available(&self) -> bool;
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Bytes one entry occupies against a backend quota.
fn entry_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}
