//! Persisted data shapes: users and their tickets, plus the validation
//! helpers shared by the service layer.

pub mod errors;
pub mod user;
pub mod ticket;

pub use ticket::{Ticket, TicketCounts, TicketPriority, TicketStatus};
pub use user::User;
