//! The draft pool.
//!
//! Up to [`MAX_DRAFTS`](crate::MAX_DRAFTS) in-progress applications live in
//! client-local storage as a JSON array of nullable entries under a single
//! key. A draft's slot index is its identity, so slots are allocated
//! first-fit and every mutation rewrites the whole array.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::application::{DraftApplication, DraftId};
use crate::storage::{LocalStorage, StorageError};
use crate::{DRAFTS_STORAGE_KEY, MAX_DRAFTS};

#[derive(Debug, Error)]
pub enum DraftPoolError {
    #[error("draft pool is full ({} slots)", MAX_DRAFTS)]
    PoolFull,

    #[error("failed to serialize draft pool: {0}")]
    Serialization(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Fixed-capacity pool of draft applications over a storage backend.
pub struct DraftPool<S: LocalStorage> {
    storage: Arc<S>,
}

impl<S: LocalStorage> DraftPool<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// The full slot array. An empty or uninitialized backend yields a pool
    /// of empty slots; a corrupted one is repaired to empty and rewritten.
    pub fn drafts(&self) -> Result<Vec<Option<DraftApplication>>, DraftPoolError> {
        let Some(raw) = self.storage.get_item(DRAFTS_STORAGE_KEY)? else {
            return Ok(empty_pool());
        };

        match serde_json::from_str::<Vec<Option<DraftApplication>>>(&raw) {
            Ok(mut slots) => {
                if slots.len() != MAX_DRAFTS {
                    warn!(
                        found = slots.len(),
                        expected = MAX_DRAFTS,
                        "draft pool has wrong slot count, normalizing"
                    );
                    slots.resize(MAX_DRAFTS, None);
                    self.store(&slots)?;
                }
                Ok(slots)
            }
            Err(err) => {
                warn!(error = %err, "draft pool storage is corrupted, resetting to an empty pool");
                let slots = empty_pool();
                self.store(&slots)?;
                Ok(slots)
            }
        }
    }

    /// Lowest-indexed empty slot, or `None` when the pool is full.
    pub fn available_slot(&self) -> Result<Option<DraftId>, DraftPoolError> {
        let slots = self.drafts()?;
        Ok(slots
            .iter()
            .position(Option::is_none)
            .and_then(|index| DraftId::new(index).ok()))
    }

    /// The draft currently held at a slot.
    pub fn draft(&self, draft_id: DraftId) -> Result<Option<DraftApplication>, DraftPoolError> {
        let slots = self.drafts()?;
        Ok(slots[draft_id.index()].clone())
    }

    /// Store the draft in its own slot, overwriting any prior content.
    pub fn write(&self, draft: &DraftApplication) -> Result<(), DraftPoolError> {
        let mut slots = self.drafts()?;
        slots[draft.draft_id.index()] = Some(draft.clone());
        self.store(&slots)
    }

    /// Empty a slot.
    pub fn clear(&self, draft_id: DraftId) -> Result<(), DraftPoolError> {
        let mut slots = self.drafts()?;
        slots[draft_id.index()] = None;
        self.store(&slots)
    }

    /// Allocate the first free slot and fill it with the draft produced by
    /// `build`. The produced draft's slot id is forced to the allocated one.
    pub fn create_with(
        &self,
        build: impl FnOnce(DraftId) -> DraftApplication,
    ) -> Result<DraftApplication, DraftPoolError> {
        let mut slots = self.drafts()?;
        let index = slots
            .iter()
            .position(Option::is_none)
            .ok_or(DraftPoolError::PoolFull)?;
        let draft_id = DraftId::new(index).map_err(|_| DraftPoolError::PoolFull)?;

        let mut draft = build(draft_id);
        draft.draft_id = draft_id;

        slots[index] = Some(draft.clone());
        self.store(&slots)?;
        Ok(draft)
    }

    fn store(&self, slots: &[Option<DraftApplication>]) -> Result<(), DraftPoolError> {
        let raw = serde_json::to_string(slots)
            .map_err(|err| DraftPoolError::Serialization(err.to_string()))?;
        self.storage.set_item(DRAFTS_STORAGE_KEY, &raw)?;
        Ok(())
    }
}

fn empty_pool() -> Vec<Option<DraftApplication>> {
    vec![None; MAX_DRAFTS]
}
