/// Whole-collection journal over a storage backend.
pub mod journal;
/// Shared in-memory backend.
pub mod memory;
/// SQLite key-value backend.
pub mod sqlite;

use crate::core::store::StoreError;

/// Storage key for the serialized record array; doubles as the format version.
pub const STORAGE_KEY: &str = "sommelier_wines_v3";

/// Persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// SQLite driver error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Encoding the collection failed.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Stored bytes are not a valid record array.
    #[error("stored journal is corrupt: {0}")]
    Corrupt(String),
    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// In-memory store rejected the change.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Anything else.
    #[error("{0}")]
    Message(String),
}

/// Result alias for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Device-local key-value slot holding the whole serialized collection.
pub trait StorageBackend: Send {
    /// Reads the stored bytes; `None` when nothing was ever saved.
    fn load(&self) -> PersistResult<Option<Vec<u8>>>;
    /// Overwrites the stored bytes.
    fn save(&mut self, bytes: &[u8]) -> PersistResult<()>;
}
