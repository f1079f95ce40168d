//! Best-effort action dispatch
//!
//! Actions run strictly in declaration order; a failing action never
//! aborts its siblings. Each external call runs under a short timeout so
//! a hung backend cannot stall evaluation of other rules.

use std::sync::Arc;
use std::time::Duration;
use ticketflow_core::{Action, ActionOutcome, ActionType, TicketSnapshot};
use tokio::time::timeout;
use uuid::Uuid;

use crate::services::{NotificationService, TagOp, TicketPatch, TicketService};
use crate::ServiceError;

const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Dispatches a rule's actions against the external services.
pub struct ActionExecutor {
    tickets: Arc<dyn TicketService>,
    notifications: Arc<dyn NotificationService>,
    action_timeout: Duration,
}

impl ActionExecutor {
    pub fn new(tickets: Arc<dyn TicketService>, notifications: Arc<dyn NotificationService>) -> Self {
        Self {
            tickets,
            notifications,
            action_timeout: DEFAULT_ACTION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, action_timeout: Duration) -> Self {
        self.action_timeout = action_timeout;
        self
    }

    /// Execute `actions` in order, collecting one outcome per action.
    pub async fn execute(
        &self,
        actions: &[Action],
        ticket: &TicketSnapshot,
        rule_id: Uuid,
    ) -> Vec<ActionOutcome> {
        let mut outcomes = Vec::with_capacity(actions.len());

        for action in actions {
            let outcome = match timeout(self.action_timeout, self.dispatch(action, ticket)).await {
                Ok(Ok(())) => ActionOutcome::ok(action.action_type),
                Ok(Err(DispatchError::MissingParameter(param))) => {
                    tracing::warn!(
                        rule_id = %rule_id,
                        action = ?action.action_type,
                        param,
                        "action skipped: required parameter missing"
                    );
                    ActionOutcome::failed(action.action_type, "missing_parameter")
                }
                Ok(Err(DispatchError::Service(err))) => {
                    tracing::warn!(
                        rule_id = %rule_id,
                        action = ?action.action_type,
                        error = %err,
                        "action failed"
                    );
                    ActionOutcome::failed(action.action_type, err.to_string())
                }
                Err(_) => {
                    tracing::warn!(
                        rule_id = %rule_id,
                        action = ?action.action_type,
                        "action timed out"
                    );
                    ActionOutcome::failed(action.action_type, "timeout")
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    async fn dispatch(&self, action: &Action, ticket: &TicketSnapshot) -> Result<(), DispatchError> {
        match action.action_type {
            ActionType::AssignTicket => {
                let assignee = require(action, "assignee")?;
                self.tickets.assign_ticket(ticket.id, assignee).await?;
            }
            ActionType::ChangeStatus => {
                let value = require(action, "value")?;
                let patch = TicketPatch {
                    status: Some(value.to_string()),
                    ..TicketPatch::default()
                };
                self.tickets.update_ticket(ticket.id, patch).await?;
            }
            ActionType::ChangePriority => {
                let value = require(action, "value")?;
                let patch = TicketPatch {
                    priority: Some(value.to_string()),
                    ..TicketPatch::default()
                };
                self.tickets.update_ticket(ticket.id, patch).await?;
            }
            ActionType::AddTag => {
                let tag = require(action, "tag")?;
                self.tickets.update_tags(ticket.id, tag, TagOp::Add).await?;
            }
            ActionType::RemoveTag => {
                let tag = require(action, "tag")?;
                self.tickets.update_tags(ticket.id, tag, TagOp::Remove).await?;
            }
            ActionType::SendEmail => {
                let body = action
                    .parameters
                    .get("template")
                    .or_else(|| action.parameters.get("message"))
                    .ok_or(DispatchError::MissingParameter("template"))?;
                self.notifications
                    .send_email(
                        &render(body, ticket),
                        &recipient_for(action, ticket),
                        &notification_context(ticket),
                    )
                    .await?;
            }
            ActionType::SendNotification => {
                let body = action
                    .parameters
                    .get("message")
                    .or_else(|| action.parameters.get("template"))
                    .ok_or(DispatchError::MissingParameter("message"))?;
                self.notifications
                    .send_notification(
                        &render(body, ticket),
                        &recipient_for(action, ticket),
                        &notification_context(ticket),
                    )
                    .await?;
            }
            ActionType::EscalateTicket => {
                let to = action.parameters.get("to").map(String::as_str);
                self.tickets.escalate(ticket.id, to).await?;
            }
            ActionType::AddComment => {
                let text = require(action, "comment")?;
                self.tickets.add_comment(ticket.id, &render(text, ticket)).await?;
            }
        }
        Ok(())
    }
}

enum DispatchError {
    MissingParameter(&'static str),
    Service(ServiceError),
}

impl From<ServiceError> for DispatchError {
    fn from(err: ServiceError) -> Self {
        DispatchError::Service(err)
    }
}

fn require<'a>(action: &'a Action, param: &'static str) -> Result<&'a str, DispatchError> {
    action
        .parameters
        .get(param)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or(DispatchError::MissingParameter(param))
}

/// Substitute `{{ticket.*}}` placeholders from the snapshot.
fn render(text: &str, ticket: &TicketSnapshot) -> String {
    text.replace("{{ticket.id}}", &ticket.id.to_string())
        .replace("{{ticket.subject}}", &ticket.subject)
        .replace("{{ticket.status}}", &ticket.status)
        .replace("{{ticket.priority}}", &ticket.priority)
        .replace("{{ticket.category}}", &ticket.category)
        .replace(
            "{{ticket.assigned_to}}",
            ticket.assigned_to.as_deref().unwrap_or("unassigned"),
        )
        .replace("{{ticket.created_by}}", &ticket.created_by)
}

/// Notifications address the `to` parameter when given, otherwise the
/// assignee, falling back to the ticket's creator.
fn recipient_for(action: &Action, ticket: &TicketSnapshot) -> String {
    action
        .parameters
        .get("to")
        .cloned()
        .or_else(|| ticket.assigned_to.clone())
        .unwrap_or_else(|| ticket.created_by.clone())
}

fn notification_context(ticket: &TicketSnapshot) -> serde_json::Value {
    serde_json::json!({
        "ticket_id": ticket.id,
        "subject": ticket.subject,
        "status": ticket.status,
        "priority": ticket.priority,
        "category": ticket.category,
        "assigned_to": ticket.assigned_to,
        "created_by": ticket.created_by,
    })
}
