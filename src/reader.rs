//! The read path: load the persisted snapshot and serve slices of it.

use crate::domain::{snapshot::Snapshot, ticket::Ticket};
use crate::error::{FlightboardError, Result};
use crate::storage::SnapshotStore;
use std::sync::Arc;

/// Returns the 1-based inclusive range `start..=end` of `items`.
///
/// Without `end` the slice runs to the end of `items`. Ranges reaching past
/// the end are truncated and a `start` past the end yields an empty slice.
/// `start < 1` or `end < start` is an [`FlightboardError::InvalidRange`].
pub fn slice_range<T>(items: &[T], start: usize, end: Option<usize>) -> Result<&[T]> {
    if start < 1 || end.map_or(false, |end| end < start) {
        return Err(FlightboardError::InvalidRange { start, end });
    }

    let from = start - 1;
    if from >= items.len() {
        return Ok(&[]);
    }

    let to = end.map_or(items.len(), |end| end.min(items.len()));
    Ok(&items[from..to])
}

/// Serves slices of the most recently persisted snapshot.
///
/// Never touches the issue source and never waits on a running sync.
#[derive(Clone)]
pub struct SnapshotReader {
    store: Arc<dyn SnapshotStore>,
}

impl SnapshotReader {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Loads the whole snapshot
    pub async fn snapshot(&self) -> Result<Snapshot> {
        match self.store.get().await? {
            Some(blob) => Snapshot::from_blob(&blob),
            None => Err(FlightboardError::SnapshotMissing),
        }
    }

    /// Number of tickets in the current snapshot
    pub async fn len(&self) -> Result<usize> {
        Ok(self.snapshot().await?.len())
    }

    /// Tickets `start..=end` (1-based) of the current snapshot
    pub async fn get_slice(&self, start: usize, end: Option<usize>) -> Result<Vec<Ticket>> {
        // Reject bad ranges before doing any I/O
        slice_range::<Ticket>(&[], start, end)?;

        let snapshot = self.snapshot().await?;
        Ok(slice_range(&snapshot.tickets, start, end)?.to_vec())
    }
}
