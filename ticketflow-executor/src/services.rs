//! Boundary traits for the external ticket and notification services
//!
//! The engine consumes these services; it never owns ticket state. The
//! surrounding application provides the real implementations.

use async_trait::async_trait;
use ticketflow_core::TicketSnapshot;
use uuid::Uuid;

use crate::ServiceError;

/// Fields an automation action may patch on a ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketPatch {
    pub status: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOp {
    Add,
    Remove,
}

/// Ticket mutation and lookup surface consumed by the engine.
#[async_trait]
pub trait TicketService: Send + Sync {
    /// Assign the ticket; the sentinel `unassigned` clears the assignee.
    async fn assign_ticket(&self, ticket_id: Uuid, assignee: &str) -> Result<(), ServiceError>;

    async fn update_ticket(&self, ticket_id: Uuid, patch: TicketPatch) -> Result<(), ServiceError>;

    async fn update_tags(&self, ticket_id: Uuid, tag: &str, op: TagOp) -> Result<(), ServiceError>;

    /// Escalate the ticket, optionally to a named role or user.
    async fn escalate(&self, ticket_id: Uuid, to: Option<&str>) -> Result<(), ServiceError>;

    async fn add_comment(&self, ticket_id: Uuid, text: &str) -> Result<(), ServiceError>;

    /// Read-only snapshot; `None` when the ticket no longer exists.
    async fn get_snapshot(&self, ticket_id: Uuid) -> Result<Option<TicketSnapshot>, ServiceError>;

    /// Open tickets eligible for the periodic time/SLA scan.
    async fn list_open_tickets(&self) -> Result<Vec<TicketSnapshot>, ServiceError>;
}

/// Outbound notification surface consumed by the engine.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_email(
        &self,
        template: &str,
        recipient: &str,
        context: &serde_json::Value,
    ) -> Result<(), ServiceError>;

    async fn send_notification(
        &self,
        message: &str,
        recipient: &str,
        context: &serde_json::Value,
    ) -> Result<(), ServiceError>;
}
