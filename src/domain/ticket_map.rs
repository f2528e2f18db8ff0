use crate::domain::{
    board::BoardConfig,
    sorting::{sort_tickets, SortSpec},
    ticket::Ticket,
};
use tracing::debug;

/// One lane of the board and the tickets collected into it
#[derive(Debug, Clone)]
struct Lane {
    name: String,
    sort: Option<SortSpec>,
    tickets: Vec<Ticket>,
}

/// Collects included tickets and emits them in board order.
///
/// Lanes follow the declaration order of the configured fields. Inside a
/// lane, tickets follow the field's `sort`, else the board-wide `epics.sort`,
/// else the order they were added in.
#[derive(Debug, Clone)]
pub struct TicketMap {
    lanes: Vec<Lane>,
    default_sort: Option<SortSpec>,
}

impl TicketMap {
    pub fn new(config: &BoardConfig) -> Self {
        let default_sort = config.epics.sort;
        let lanes = config
            .epics
            .fields
            .iter()
            .map(|(name, rule)| Lane {
                name: name.to_string(),
                sort: rule.sort.or(default_sort),
                tickets: Vec::new(),
            })
            .collect();

        Self {
            lanes,
            default_sort,
        }
    }

    /// Adds a ticket to its lane. Returns `false` for excluded tickets, which
    /// are never stored.
    pub fn add_ticket(&mut self, ticket: Ticket) -> bool {
        if !ticket.included {
            debug!(key = %ticket.key, field = %ticket.field, "ticket excluded by field rules");
            return false;
        }

        let position = match self.lanes.iter().position(|lane| lane.name == ticket.lane) {
            Some(position) => position,
            None => {
                self.lanes.push(Lane {
                    name: ticket.lane.clone(),
                    sort: self.default_sort,
                    tickets: Vec::new(),
                });
                self.lanes.len() - 1
            }
        };

        self.lanes[position].tickets.push(ticket);
        true
    }

    /// Number of tickets collected
    pub fn len(&self) -> usize {
        self.lanes.iter().map(|lane| lane.tickets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tickets in final board order
    pub fn get_list(&self) -> Vec<Ticket> {
        self.clone().into_list()
    }

    /// Consumes the map, returning tickets in final board order
    pub fn into_list(self) -> Vec<Ticket> {
        let mut list = Vec::with_capacity(self.len());
        for mut lane in self.lanes {
            if let Some(spec) = lane.sort {
                sort_tickets(&mut lane.tickets, spec);
            }
            list.append(&mut lane.tickets);
        }
        list
    }
}
