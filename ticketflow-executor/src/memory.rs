//! In-memory ticket and notification backend for development and testing
//!
//! Applies mutations to held snapshots and records every call it
//! receives, so tests can assert on exactly which side effects a rule
//! produced.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::RwLock;
use ticketflow_core::TicketSnapshot;
use uuid::Uuid;

use crate::services::{NotificationService, TagOp, TicketPatch, TicketService};
use crate::ServiceError;

/// A call recorded by the hub, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    Assign {
        ticket_id: Uuid,
        assignee: String,
    },
    Update {
        ticket_id: Uuid,
        patch: TicketPatch,
    },
    Tags {
        ticket_id: Uuid,
        tag: String,
        op: TagOp,
    },
    Escalate {
        ticket_id: Uuid,
        to: Option<String>,
    },
    Comment {
        ticket_id: Uuid,
        text: String,
    },
    Email {
        template: String,
        recipient: String,
    },
    Notification {
        message: String,
        recipient: String,
    },
}

/// In-memory implementation of both service boundaries.
pub struct InMemoryTicketHub {
    tickets: RwLock<HashMap<Uuid, TicketSnapshot>>,
    calls: Mutex<Vec<ServiceCall>>,
}

impl InMemoryTicketHub {
    pub fn new() -> Self {
        Self {
            tickets: RwLock::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn insert_ticket(&self, ticket: TicketSnapshot) {
        self.tickets.write().unwrap().insert(ticket.id, ticket);
    }

    /// Every service call seen so far, in order.
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: ServiceCall) {
        self.calls.lock().push(call);
    }

    fn mutate(
        &self,
        ticket_id: Uuid,
        apply: impl FnOnce(&mut TicketSnapshot),
    ) -> Result<(), ServiceError> {
        let mut tickets = self.tickets.write().unwrap();
        match tickets.get_mut(&ticket_id) {
            Some(ticket) => {
                apply(ticket);
                ticket.updated_at = Utc::now();
                Ok(())
            }
            None => Err(ServiceError::NotFound(format!(
                "Ticket {} not found",
                ticket_id
            ))),
        }
    }
}

impl Default for InMemoryTicketHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketService for InMemoryTicketHub {
    async fn assign_ticket(&self, ticket_id: Uuid, assignee: &str) -> Result<(), ServiceError> {
        self.record(ServiceCall::Assign {
            ticket_id,
            assignee: assignee.to_string(),
        });
        self.mutate(ticket_id, |ticket| {
            ticket.assigned_to = if assignee == "unassigned" {
                None
            } else {
                Some(assignee.to_string())
            };
        })
    }

    async fn update_ticket(&self, ticket_id: Uuid, patch: TicketPatch) -> Result<(), ServiceError> {
        self.record(ServiceCall::Update {
            ticket_id,
            patch: patch.clone(),
        });
        self.mutate(ticket_id, |ticket| {
            if let Some(status) = patch.status {
                ticket.status = status;
            }
            if let Some(priority) = patch.priority {
                ticket.priority = priority;
            }
        })
    }

    async fn update_tags(&self, ticket_id: Uuid, tag: &str, op: TagOp) -> Result<(), ServiceError> {
        self.record(ServiceCall::Tags {
            ticket_id,
            tag: tag.to_string(),
            op,
        });
        self.mutate(ticket_id, |ticket| match op {
            TagOp::Add => {
                if !ticket.tags.iter().any(|t| t == tag) {
                    ticket.tags.push(tag.to_string());
                }
            }
            TagOp::Remove => ticket.tags.retain(|t| t != tag),
        })
    }

    async fn escalate(&self, ticket_id: Uuid, to: Option<&str>) -> Result<(), ServiceError> {
        self.record(ServiceCall::Escalate {
            ticket_id,
            to: to.map(str::to_string),
        });
        self.mutate(ticket_id, |ticket| {
            ticket.priority = "urgent".to_string();
            if let Some(to) = to {
                ticket.assigned_to = Some(to.to_string());
            }
        })
    }

    async fn add_comment(&self, ticket_id: Uuid, text: &str) -> Result<(), ServiceError> {
        self.record(ServiceCall::Comment {
            ticket_id,
            text: text.to_string(),
        });
        // comments live in the surrounding application; the snapshot only
        // needs its freshness bumped
        self.mutate(ticket_id, |_| {})
    }

    async fn get_snapshot(&self, ticket_id: Uuid) -> Result<Option<TicketSnapshot>, ServiceError> {
        Ok(self.tickets.read().unwrap().get(&ticket_id).cloned())
    }

    async fn list_open_tickets(&self) -> Result<Vec<TicketSnapshot>, ServiceError> {
        let tickets = self.tickets.read().unwrap();
        Ok(tickets
            .values()
            .filter(|t| t.status != "closed" && t.status != "resolved")
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationService for InMemoryTicketHub {
    async fn send_email(
        &self,
        template: &str,
        recipient: &str,
        _context: &serde_json::Value,
    ) -> Result<(), ServiceError> {
        self.record(ServiceCall::Email {
            template: template.to_string(),
            recipient: recipient.to_string(),
        });
        Ok(())
    }

    async fn send_notification(
        &self,
        message: &str,
        recipient: &str,
        _context: &serde_json::Value,
    ) -> Result<(), ServiceError> {
        self.record(ServiceCall::Notification {
            message: message.to_string(),
            recipient: recipient.to_string(),
        });
        Ok(())
    }
}
