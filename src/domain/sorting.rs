use crate::domain::ticket::Ticket;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Fields available for ordering tickets inside a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Key,
    Summary,
    DueDate,
    Updated,
    Priority,
    Team,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

/// A secondary sort key as declared in the board configuration
///
/// ```json
/// { "by": "due_date", "order": "asc" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub by: SortField,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(by: SortField, order: SortOrder) -> Self {
        Self { by, order }
    }
}

/// Sorts tickets in-place according to `spec`.
///
/// The sort is stable, so tickets comparing equal keep the order in which
/// they were added to their lane.
///
/// # Examples
/// ```
/// use flightboard_core::domain::sorting::{sort_tickets, SortField, SortOrder, SortSpec};
/// use flightboard_core::domain::ticket::{Ticket, TicketKey};
///
/// let mut tickets = vec![
///     Ticket::new("FLT-3".parse::<TicketKey>().unwrap(), "todo"),
///     Ticket::new("FLT-1".parse::<TicketKey>().unwrap(), "todo"),
///     Ticket::new("FLT-2".parse::<TicketKey>().unwrap(), "todo"),
/// ];
///
/// sort_tickets(&mut tickets, SortSpec::new(SortField::Key, SortOrder::Ascending));
/// assert_eq!(tickets[0].key.as_str(), "FLT-1");
/// ```
pub fn sort_tickets(tickets: &mut [Ticket], spec: SortSpec) {
    tickets.sort_by(|a, b| {
        let cmp = match spec.by {
            SortField::Key => a.key.cmp(&b.key),
            SortField::Summary => a.summary.to_lowercase().cmp(&b.summary.to_lowercase()),
            SortField::DueDate => compare_option_dates(a.due_date, b.due_date),
            SortField::Updated => compare_option_timestamps(a.updated, b.updated),
            SortField::Priority => compare_priority(a.priority.as_deref(), b.priority.as_deref()),
            SortField::Team => compare_option_str(a.team_label(), b.team_label()),
        };

        match spec.order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Compare tracker priorities by urgency
///
/// Order: Blocker → Highest/Critical → High/Major → Medium → Low/Minor → Lowest/Trivial.
/// Unknown names sort after known ones (alphabetically among themselves),
/// and a missing priority sorts last.
fn compare_priority(a: Option<&str>, b: Option<&str>) -> Ordering {
    fn rank(p: &str) -> Option<u8> {
        match p.to_lowercase().as_str() {
            "blocker" => Some(0),
            "highest" | "critical" => Some(1),
            "high" | "major" => Some(2),
            "medium" => Some(3),
            "low" | "minor" => Some(4),
            "lowest" | "trivial" => Some(5),
            _ => None,
        }
    }

    match (a, b) {
        (Some(a), Some(b)) => match (rank(a), rank(b)) {
            (Some(ra), Some(rb)) => ra.cmp(&rb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.to_lowercase().cmp(&b.to_lowercase()),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Compare optional dates with None always sorting to end
fn compare_option_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a_date), Some(b_date)) => a_date.cmp(&b_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_option_timestamps(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a_ts), Some(b_ts)) => a_ts.cmp(&b_ts),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_option_str(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
