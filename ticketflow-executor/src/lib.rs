//! Action execution for the automation engine
//!
//! Owns the boundary traits for the external ticket and notification
//! services and the best-effort executor that dispatches a rule's actions
//! against them, collecting per-action outcomes instead of failing fast.

pub mod error;
pub mod executor;
pub mod memory;
pub mod services;

pub use error::ServiceError;
pub use executor::ActionExecutor;
pub use memory::{InMemoryTicketHub, ServiceCall};
pub use services::{NotificationService, TagOp, TicketPatch, TicketService};
