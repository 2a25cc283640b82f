use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::ticket::Ticket;

/// A registered account as stored in the users document.
///
/// `password` always holds a PHC-formatted hash. `ticket_seq` is the highest
/// ticket number ever handed out for this user, so ids survive deletions
/// without being reused.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub ticket_seq: u64,
}

impl User {
    pub fn new(name: &str, email: &str, password_hash: String) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            password: password_hash,
            tickets: Vec::new(),
            ticket_seq: 0,
        }
    }

    /// Largest `tN` number among the current tickets.
    pub fn highest_ticket_seq(&self) -> u64 {
        self.tickets.iter().filter_map(Ticket::seq).max().unwrap_or(0)
    }

    /// Raise `ticket_seq` so it covers every id currently in the list.
    pub fn sync_ticket_seq(&mut self) {
        self.ticket_seq = self.ticket_seq.max(self.highest_ticket_seq());
    }

    /// Id the next created ticket will get.
    ///
    /// Fails once the counter is exhausted, which only a hand-edited
    /// document can cause.
    pub fn next_ticket_id(&self) -> Result<String, ModelError> {
        self.ticket_seq
            .max(self.highest_ticket_seq())
            .checked_add(1)
            .map(Ticket::id_for_seq)
            .ok_or_else(|| ModelError::Validation("ticket id counter exhausted".into()))
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("tickets", &self.tickets)
            .field("ticket_seq", &self.ticket_seq)
            .finish()
    }
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    Ok(())
}
