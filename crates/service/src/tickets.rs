//! Ticket list operations for one user.
//!
//! Every mutation builds the new list and hands it to
//! [`JsonUserStore::set_user_tickets`]; there are no partial writes.

use chrono::NaiveDate;
use models::{ticket, Ticket, TicketCounts, TicketPriority, TicketStatus};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{errors::ServiceError, storage::JsonUserStore};

/// Create/edit form. Missing status/priority fall back to `open`/`high` on
/// create and keep the current values on edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
}

impl TicketInput {
    pub fn validate(&self) -> Result<(), ServiceError> {
        ticket::validate_title(&self.title)?;
        Ok(())
    }
}

/// Tickets of the user owning `email`, in stored order.
pub fn list_tickets<'a>(store: &'a JsonUserStore, email: &str) -> Result<&'a [Ticket], ServiceError> {
    Ok(&store.user_by_email(email)?.tickets)
}

pub fn find_ticket<'a>(store: &'a JsonUserStore, email: &str, id: &str) -> Result<&'a Ticket, ServiceError> {
    list_tickets(store, email)?
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| ServiceError::not_found("ticket"))
}

pub fn ticket_counts(tickets: &[Ticket]) -> TicketCounts {
    TicketCounts::from_tickets(tickets)
}

/// Append a ticket with the next id from the user's counter.
#[instrument(skip(store, input), fields(title = %input.title))]
pub async fn create_ticket(
    store: &mut JsonUserStore,
    email: &str,
    input: TicketInput,
    today: NaiveDate,
) -> Result<Ticket, ServiceError> {
    input.validate()?;
    let user = store.user_by_email(email)?;
    let created = Ticket {
        id: user.next_ticket_id()?,
        title: input.title,
        description: input.description,
        status: input.status.unwrap_or_default(),
        priority: input.priority.unwrap_or_default(),
        date: today,
    };

    let mut tickets = user.tickets.clone();
    tickets.push(created.clone());
    store.set_user_tickets(email, tickets).await?;
    info!(id = %created.id, "ticket_created");
    Ok(created)
}

/// Overwrite an existing ticket's fields and stamp it with `today`.
#[instrument(skip(store, input))]
pub async fn update_ticket(
    store: &mut JsonUserStore,
    email: &str,
    id: &str,
    input: TicketInput,
    today: NaiveDate,
) -> Result<Ticket, ServiceError> {
    input.validate()?;
    let mut tickets = list_tickets(store, email)?.to_vec();
    let target = tickets
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| ServiceError::not_found("ticket"))?;

    target.title = input.title;
    target.description = input.description;
    if let Some(status) = input.status { target.status = status; }
    if let Some(priority) = input.priority { target.priority = priority; }
    target.date = today;
    let updated = target.clone();

    store.set_user_tickets(email, tickets).await?;
    info!("ticket_updated");
    Ok(updated)
}

/// Remove a ticket; returns the removed record.
#[instrument(skip(store))]
pub async fn delete_ticket(store: &mut JsonUserStore, email: &str, id: &str) -> Result<Ticket, ServiceError> {
    let mut tickets = list_tickets(store, email)?.to_vec();
    let pos = tickets
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| ServiceError::not_found("ticket"))?;
    let removed = tickets.remove(pos);

    store.set_user_tickets(email, tickets).await?;
    info!("ticket_deleted");
    Ok(removed)
}
