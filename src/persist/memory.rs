use std::sync::{Arc, Mutex};

use super::{PersistError, PersistResult, StorageBackend};

#[derive(Debug, Default)]
struct Slot {
    bytes: Option<Vec<u8>>,
    saves: usize,
    fail_saves: bool,
}

/// Process-local backend. Clones share one slot, so a test can keep a
/// clone to inspect what a [`super::journal::Journal`] wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slot: Arc<Mutex<Slot>>,
}

impl MemoryBackend {
    /// Empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend preloaded with `bytes`.
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        let backend = Self::new();
        if let Ok(mut slot) = backend.slot.lock() {
            slot.bytes = Some(bytes);
        }
        backend
    }

    /// Currently stored bytes.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.slot.lock().ok().and_then(|s| s.bytes.clone())
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.slot.lock().map(|s| s.saves).unwrap_or(0)
    }

    /// Makes subsequent saves fail until reset.
    pub fn set_fail_saves(&self, fail: bool) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.fail_saves = fail;
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self) -> PersistResult<Option<Vec<u8>>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| PersistError::Message("memory backend poisoned".to_string()))?;
        Ok(slot.bytes.clone())
    }

    fn save(&mut self, bytes: &[u8]) -> PersistResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| PersistError::Message("memory backend poisoned".to_string()))?;
        if slot.fail_saves {
            return Err(PersistError::Message("memory backend rejected save".to_string()));
        }
        slot.bytes = Some(bytes.to_vec());
        slot.saves += 1;
        Ok(())
    }
}
