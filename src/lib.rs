//! # Flightboard Core
//!
//! Rule-driven classification of tracker issues into board lanes, and the
//! sync/serve split that puts them on screen.
//!
//! A sync run fetches issues through an [`IssueSource`], classifies them
//! against the compiled field rules, orders them lane by lane and persists
//! the result as one [`Snapshot`] in a [`SnapshotStore`]. The read path
//! ([`SnapshotReader`]) only ever looks at the stored snapshot.

pub mod domain;
pub mod error;
pub mod reader;
pub mod storage;
pub mod sync;

// Re-export commonly used types
pub use domain::{
    board::{BoardConfig, FieldRule},
    issue::RawIssue,
    rules::{compile, StateIndex},
    snapshot::Snapshot,
    ticket::{Ticket, TicketKey},
    ticket_map::TicketMap,
};
pub use error::{FlightboardError, Result, SkipReason};
pub use reader::SnapshotReader;
pub use storage::SnapshotStore;
pub use sync::{IssueSource, SyncOrchestrator, SyncReport};
