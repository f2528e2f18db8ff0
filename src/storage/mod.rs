use crate::error::Result;
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

#[cfg(feature = "file-storage")]
pub use file_storage::FileSnapshotStore;
pub use memory_storage::MemorySnapshotStore;
#[cfg(feature = "sqlite-storage")]
pub use sqlite_storage::SqliteSnapshotStore;

/// Storage for the serialized board snapshot.
///
/// Implementations hold exactly one blob. `put` must replace it atomically:
/// a concurrent `get` returns either the previous blob or the new one, never
/// a partial write.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Replaces the stored snapshot
    async fn put(&self, blob: &[u8]) -> Result<()>;

    /// Loads the stored snapshot, or `None` if nothing was ever written
    async fn get(&self) -> Result<Option<Vec<u8>>>;
}
