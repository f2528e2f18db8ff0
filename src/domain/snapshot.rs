use crate::domain::ticket::Ticket;
use crate::error::{FlightboardError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The ordered ticket list produced by one sync run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub tickets: Vec<Ticket>,
}

impl Snapshot {
    pub fn new(tickets: Vec<Ticket>) -> Self {
        Self {
            generated_at: Utc::now(),
            tickets,
        }
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Serializes the snapshot into the blob handed to storage
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parses a stored blob. A blob that does not decode is reported as
    /// corrupt rather than as missing.
    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        serde_json::from_slice(blob).map_err(|e| FlightboardError::SnapshotCorrupt(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ticket::TicketKey;

    #[test]
    fn test_blob_round_trip() {
        let snapshot = Snapshot::new(vec![Ticket::new(
            "FLT-1".parse::<TicketKey>().unwrap(),
            "todo",
        )]);

        let blob = snapshot.to_blob().unwrap();
        assert_eq!(Snapshot::from_blob(&blob).unwrap(), snapshot);
    }

    #[test]
    fn test_truncated_blob_is_corrupt() {
        let snapshot = Snapshot::new(Vec::new());
        let blob = snapshot.to_blob().unwrap();

        let err = Snapshot::from_blob(&blob[..blob.len() / 2]).unwrap_err();
        assert!(matches!(err, FlightboardError::SnapshotCorrupt(_)));
    }

    #[test]
    fn test_invalid_ticket_key_is_corrupt() {
        let blob = br#"{ "generated_at": "2024-05-15T00:00:00Z", "tickets": [
            { "key": "nope", "summary": "", "field": "todo", "lane": "todo", "status": "Open",
              "resolution": null, "team": null, "team_name": null, "label": "todo", "included": true }
        ] }"#;

        let err = Snapshot::from_blob(blob).unwrap_err();
        assert!(matches!(err, FlightboardError::SnapshotCorrupt(_)));
    }
}
