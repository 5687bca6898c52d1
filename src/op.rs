//! Store mutation model and inverses used for rollback.

use crate::{types::WineId, wine::WineNote};

/// One applied change to the record collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Prepend a new record.
    Insert {
        /// Inserted record.
        note: WineNote,
    },
    /// Replace a record in place.
    Replace {
        /// Record id.
        id: WineId,
        /// Record contents after the change.
        note: WineNote,
        /// Record contents before the change.
        prev: WineNote,
    },
    /// Delete a record.
    Remove {
        /// Removed record.
        note: WineNote,
        /// Index the record occupied in stored order.
        position: usize,
    },
}

impl Mutation {
    /// Id of the record this mutation touched.
    pub fn id(&self) -> &WineId {
        match self {
            Mutation::Insert { note } => &note.id,
            Mutation::Replace { id, .. } => id,
            Mutation::Remove { note, .. } => &note.id,
        }
    }
}
