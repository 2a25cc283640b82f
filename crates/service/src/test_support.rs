#![cfg(test)]
use std::path::PathBuf;

use chrono::NaiveDate;
use models::{Ticket, TicketPriority, TicketStatus};

/// Unique users-file path under the system temp dir; the file is not created.
pub fn temp_users_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ticketdesk_{}_{}.json", tag, uuid::Uuid::new_v4()))
}

pub fn sample_ticket(id: &str, status: TicketStatus) -> Ticket {
    Ticket {
        id: id.to_string(),
        title: format!("ticket {id}"),
        description: "printer on floor 2 is jammed".into(),
        status,
        priority: TicketPriority::High,
        date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
    }
}
