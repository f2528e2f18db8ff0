use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlightboardError>;

#[derive(Debug, Error)]
pub enum FlightboardError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to fetch issues: {0}")]
    FetchError(String),

    #[error("Invalid issue key: {0}")]
    InvalidTicketKey(String),

    #[error("No data available yet. Run a sync first.")]
    SnapshotMissing,

    #[error("Snapshot is corrupt: {0}")]
    SnapshotCorrupt(String),

    #[error("Invalid range: start must be >= 1 and end >= start (start={start}, end={end:?})")]
    InvalidRange { start: usize, end: Option<usize> },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Why a single raw issue was left out of a sync run.
///
/// Skips never abort a sync; they are counted in the run's report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("malformed issue record: {0}")]
    Malformed(String),

    #[error("no lane configured for status '{0}'")]
    UnmappedStatus(String),

    #[error("no lane configured for status '{status}' with resolution {resolution:?}")]
    UnmappedResolution {
        status: String,
        resolution: Option<String>,
    },
}
