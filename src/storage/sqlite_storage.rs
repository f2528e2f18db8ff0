use crate::{
    error::{FlightboardError, Result},
    storage::SnapshotStore,
};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Mutex;

/// SQLite-based snapshot storage
///
/// The snapshot lives in a single row that is replaced by one statement, so
/// readers see either the old or the new payload.
pub struct SqliteSnapshotStore {
    connection: Mutex<Connection>,
}

fn storage_error(err: rusqlite::Error) -> FlightboardError {
    FlightboardError::StorageError(err.to_string())
}

impl SqliteSnapshotStore {
    /// Opens (or creates) a database file
    pub fn new(database_path: &str) -> Result<Self> {
        Self::with_connection(Connection::open(database_path).map_err(storage_error)?)
    }

    /// Creates a store backed by a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory().map_err(storage_error)?)
    }

    fn with_connection(connection: Connection) -> Result<Self> {
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS snapshot (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    payload BLOB NOT NULL,
                    written_at TEXT NOT NULL
                );",
            )
            .map_err(storage_error)?;

        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| FlightboardError::StorageError("sqlite connection lock poisoned".to_string()))
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn put(&self, blob: &[u8]) -> Result<()> {
        let connection = self.lock()?;
        connection
            .execute(
                "INSERT OR REPLACE INTO snapshot (id, payload, written_at) VALUES (1, ?1, ?2)",
                params![blob, chrono::Utc::now().to_rfc3339()],
            )
            .map_err(storage_error)?;
        Ok(())
    }

    async fn get(&self) -> Result<Option<Vec<u8>>> {
        let connection = self.lock()?;
        connection
            .query_row("SELECT payload FROM snapshot WHERE id = 1", [], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()
            .map_err(storage_error)
    }
}
