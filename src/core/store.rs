use std::collections::VecDeque;

use hashbrown::HashMap;
use tracing::warn;

use crate::{
    core::sort,
    op::Mutation,
    types::{SortBy, WineId},
    wine::WineNote,
};

/// In-memory store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A record with this id is already stored.
    #[error("record {0} already exists")]
    AlreadyExists(WineId),
}

/// Authoritative newest-first collection of tasting records.
#[derive(Debug, Default, Clone)]
pub struct WineStore {
    records: HashMap<WineId, WineNote>,
    order: VecDeque<WineId>,
}

impl WineStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from a persisted array, keeping its order.
    ///
    /// Duplicate ids (possible in journals written before ids carried a
    /// random suffix) are re-keyed rather than dropped.
    pub fn from_notes(notes: Vec<WineNote>) -> Self {
        let mut store = Self::new();
        for mut note in notes {
            if store.records.contains_key(&note.id) {
                let original = note.id.clone();
                let mut n = 2usize;
                while store.records.contains_key(&format!("{original}-{n}")) {
                    n += 1;
                }
                note.id = format!("{original}-{n}");
                warn!(original = %original, rekeyed = %note.id, "duplicate record id in journal");
            }
            store.order.push_back(note.id.clone());
            store.records.insert(note.id.clone(), note);
        }
        store
    }

    /// Clones the collection in stored order.
    pub fn export_notes(&self) -> Vec<WineNote> {
        self.iter().cloned().collect()
    }

    /// Prepends `note`.
    pub fn insert(&mut self, note: WineNote) -> Result<Mutation, StoreError> {
        if self.records.contains_key(&note.id) {
            return Err(StoreError::AlreadyExists(note.id));
        }
        self.order.push_front(note.id.clone());
        self.records.insert(note.id.clone(), note.clone());
        Ok(Mutation::Insert { note })
    }

    /// Replaces the record stored under `id`, keeping its position and id.
    ///
    /// Returns `None` without touching anything when `id` is unknown.
    pub fn replace(&mut self, id: &str, mut note: WineNote) -> Option<Mutation> {
        let slot = self.records.get_mut(id)?;
        note.id = slot.id.clone();
        let prev = std::mem::replace(slot, note.clone());
        Some(Mutation::Replace {
            id: prev.id.clone(),
            note,
            prev,
        })
    }

    /// Removes the record stored under `id`; `None` when unknown.
    pub fn remove(&mut self, id: &str) -> Option<Mutation> {
        let note = self.records.remove(id)?;
        let position = self.order.iter().position(|x| x == id).unwrap_or(self.order.len());
        if position < self.order.len() {
            self.order.remove(position);
        }
        Some(Mutation::Remove { note, position })
    }

    /// Undoes a mutation previously returned by this store.
    pub fn revert(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::Insert { note } => {
                self.records.remove(&note.id);
                if let Some(pos) = self.order.iter().position(|x| *x == note.id) {
                    self.order.remove(pos);
                }
            }
            Mutation::Replace { id, prev, .. } => {
                self.records.insert(id, prev);
            }
            Mutation::Remove { note, position } => {
                let position = position.min(self.order.len());
                self.order.insert(position, note.id.clone());
                self.records.insert(note.id.clone(), note);
            }
        }
    }

    /// Ordered copy of the collection; stored order is left untouched.
    pub fn sorted_view(&self, by: SortBy) -> Vec<WineNote> {
        let mut out = self.export_notes();
        out.sort_by(|a, b| sort::compare(by, a, b));
        out
    }

    /// Borrows the record stored under `id`.
    pub fn get(&self, id: &str) -> Option<&WineNote> {
        self.records.get(id)
    }

    /// Clones the record stored under `id`.
    pub fn get_cloned(&self, id: &str) -> Option<WineNote> {
        self.get(id).cloned()
    }

    /// True when a record is stored under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Records in stored (newest-first insertion) order.
    pub fn iter(&self) -> impl Iterator<Item = &WineNote> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Ids in stored order.
    pub fn ordered_ids(&self) -> Vec<WineId> {
        self.order.iter().cloned().collect()
    }
}
