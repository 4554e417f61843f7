use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::PersistenceError;
use crate::scene::LayoutSnapshot;
use crate::terrain::Terrain;

/// Where the session sends snapshots to be stored durably.
///
/// Calls must not block on storage latency: an implementation hands the
/// snapshot off and reports failures later through its own channel. An `Err`
/// here means the hand-off itself failed. The session never retries.
pub trait SnapshotSink {
    fn store_terrain(&self, terrain: &Terrain) -> Result<(), PersistenceError>;
    fn store_layout(&self, layout: &LayoutSnapshot) -> Result<(), PersistenceError>;
}

#[derive(Debug, Default)]
struct Stored {
    terrains: Vec<Terrain>,
    layouts: Vec<LayoutSnapshot>,
}

// Keeps every snapshot in memory. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    stored: Arc<Mutex<Stored>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terrains(&self) -> Result<Vec<Terrain>, PersistenceError> {
        Ok(self.lock()?.terrains.clone())
    }

    pub fn layouts(&self) -> Result<Vec<LayoutSnapshot>, PersistenceError> {
        Ok(self.lock()?.layouts.clone())
    }

    pub fn latest_layout(&self) -> Result<Option<LayoutSnapshot>, PersistenceError> {
        Ok(self.lock()?.layouts.last().cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Stored>, PersistenceError> {
        self.stored
            .lock()
            .map_err(|_| PersistenceError::Backend("memory store poisoned".into()))
    }
}

impl SnapshotSink for MemorySink {
    fn store_terrain(&self, terrain: &Terrain) -> Result<(), PersistenceError> {
        let mut stored = self.lock()?;
        stored.terrains.push(terrain.clone());
        Ok(())
    }

    fn store_layout(&self, layout: &LayoutSnapshot) -> Result<(), PersistenceError> {
        let mut stored = self.lock()?;
        stored.layouts.push(layout.clone());
        Ok(())
    }
}
