//! Runtime event stream payloads.

use crate::types::WineId;

/// Events emitted from the single-writer journal loop after a change is
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEvent {
    /// A new record was added.
    Added {
        /// Added record id.
        id: WineId,
    },
    /// A record was replaced by an edit.
    Updated {
        /// Updated record id.
        id: WineId,
    },
    /// A record was deleted.
    Removed {
        /// Deleted record id.
        id: WineId,
    },
}
