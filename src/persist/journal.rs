use tracing::{debug, error, info};

use crate::{
    core::store::WineStore,
    op::Mutation,
    types::SortBy,
    wine::WineNote,
};

use super::{PersistError, PersistResult, StorageBackend};

/// Record store kept in lockstep with its backend.
///
/// Every mutation re-serializes the full collection and saves it before
/// returning. A failed save reverts the in-memory change, so memory and
/// storage never disagree after a call returns.
pub struct Journal {
    store: WineStore,
    backend: Box<dyn StorageBackend>,
}

impl Journal {
    /// Loads the persisted collection from `backend`.
    ///
    /// Missing data yields an empty journal; undecodable data is fatal.
    pub fn open(backend: Box<dyn StorageBackend>) -> PersistResult<Self> {
        let store = match backend.load()? {
            Some(bytes) => WineStore::from_notes(decode_notes(&bytes)?),
            None => WineStore::new(),
        };
        info!(records = store.len(), "journal loaded");
        Ok(Self { store, backend })
    }

    /// Prepends `note` and persists.
    pub fn insert(&mut self, note: WineNote) -> PersistResult<()> {
        let mutation = self.store.insert(note)?;
        self.commit(mutation)
    }

    /// Replaces the record under `id` and persists.
    ///
    /// Returns `Ok(false)` without writing when `id` is unknown.
    pub fn replace(&mut self, id: &str, note: WineNote) -> PersistResult<bool> {
        let Some(mutation) = self.store.replace(id, note) else {
            debug!(id, "replace skipped: unknown id");
            return Ok(false);
        };
        self.commit(mutation).map(|()| true)
    }

    /// Deletes the record under `id` and persists.
    ///
    /// Returns `Ok(false)` without writing when `id` is unknown.
    pub fn remove(&mut self, id: &str) -> PersistResult<bool> {
        let Some(mutation) = self.store.remove(id) else {
            debug!(id, "remove skipped: unknown id");
            return Ok(false);
        };
        self.commit(mutation).map(|()| true)
    }

    /// Non-destructive ordered copy of the collection.
    pub fn sorted_view(&self, by: SortBy) -> Vec<WineNote> {
        self.store.sorted_view(by)
    }

    /// Read access to the in-memory store.
    pub fn store(&self) -> &WineStore {
        &self.store
    }

    /// Pretty JSON array of the collection, in stored order.
    pub fn export_json(&self) -> PersistResult<String> {
        Ok(serde_json::to_string_pretty(&self.store.export_notes())?)
    }

    fn commit(&mut self, mutation: Mutation) -> PersistResult<()> {
        let saved = encode_notes(&self.store.export_notes())
            .and_then(|bytes| self.backend.save(&bytes).map(|()| bytes.len()));
        match saved {
            Ok(bytes) => {
                debug!(id = %mutation.id(), records = self.store.len(), bytes, "journal saved");
                Ok(())
            }
            Err(err) => {
                error!(id = %mutation.id(), error = %err, "journal save failed; reverting");
                self.store.revert(mutation);
                Err(err)
            }
        }
    }
}

/// Serializes records as the JSON array stored under the journal key.
pub fn encode_notes(notes: &[WineNote]) -> PersistResult<Vec<u8>> {
    Ok(serde_json::to_vec(notes)?)
}

/// Parses a stored JSON array of records.
pub fn decode_notes(bytes: &[u8]) -> PersistResult<Vec<WineNote>> {
    serde_json::from_slice(bytes).map_err(|e| PersistError::Corrupt(e.to_string()))
}
