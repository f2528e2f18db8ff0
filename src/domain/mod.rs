pub mod board;
pub mod classifier;
pub mod issue;
pub mod rules;
pub mod snapshot;
pub mod sorting;
pub mod ticket;
pub mod ticket_map;

pub use board::{BoardConfig, EpicsConfig, FieldRule, FieldSet, OneOrMany};
pub use classifier::Classifier;
pub use issue::RawIssue;
pub use rules::{compile, FieldSelector, StateIndex};
pub use snapshot::Snapshot;
pub use sorting::{sort_tickets, SortField, SortOrder, SortSpec};
pub use ticket::{Ticket, TicketKey};
pub use ticket_map::TicketMap;
