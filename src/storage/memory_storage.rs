use crate::{
    error::{FlightboardError, Result},
    storage::SnapshotStore,
};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// In-process snapshot storage
///
/// The blob is swapped as a whole under a lock, which is enough for a single
/// process serving the board or for tests.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    blob: RwLock<Option<Arc<Vec<u8>>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn put(&self, blob: &[u8]) -> Result<()> {
        let next = Arc::new(blob.to_vec());
        let mut slot = self
            .blob
            .write()
            .map_err(|_| FlightboardError::StorageError("snapshot lock poisoned".to_string()))?;
        *slot = Some(next);
        Ok(())
    }

    async fn get(&self) -> Result<Option<Vec<u8>>> {
        let current = self
            .blob
            .read()
            .map_err(|_| FlightboardError::StorageError("snapshot lock poisoned".to_string()))?
            .clone();
        Ok(current.map(|blob| blob.as_ref().clone()))
    }
}
