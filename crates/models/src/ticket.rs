use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Prefix of every ticket id (`t1`, `t2`, ...).
pub const TICKET_ID_PREFIX: char = 't';

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    #[default]
    High,
}

/// A ticket owned by exactly one user. `date` is the day of the last create or edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub priority: TicketPriority,
    pub date: NaiveDate,
}

impl Ticket {
    /// Id for the `seq`-th ticket of a user.
    pub fn id_for_seq(seq: u64) -> String {
        format!("{TICKET_ID_PREFIX}{seq}")
    }

    /// Numeric part of a `tN` id; `None` for ids in any other shape.
    pub fn seq(&self) -> Option<u64> {
        self.id.strip_prefix(TICKET_ID_PREFIX)?.parse().ok()
    }
}

pub fn validate_title(title: &str) -> Result<(), ModelError> {
    if title.trim().is_empty() {
        return Err(ModelError::Validation("title required".into()));
    }
    Ok(())
}

/// Per-status tallies shown on the dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketCounts {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub closed: usize,
}

impl TicketCounts {
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        tickets.iter().fold(Self { total: tickets.len(), ..Self::default() }, |mut c, t| {
            match t.status {
                TicketStatus::Open => c.open += 1,
                TicketStatus::InProgress => c.in_progress += 1,
                TicketStatus::Closed => c.closed += 1,
            }
            c
        })
    }
}
