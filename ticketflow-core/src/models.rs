//! Core domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Lifecycle event categories a rule can respond to.
///
/// `time_based` and `sla_breached` are synthesized by the periodic scan
/// rather than emitted by the ticket mutation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    TicketCreated,
    TicketUpdated,
    CommentAdded,
    StatusChanged,
    PriorityChanged,
    AssignedChanged,
    TimeBased,
    SlaBreached,
}

/// Trigger clause of a rule: an event category plus trigger-specific
/// parameters (e.g. the elapsed-minutes threshold for `time_based`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "type")]
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl Trigger {
    pub fn new(trigger_type: TriggerType) -> Self {
        Self {
            trigger_type,
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }
}

/// Comparison operators available to conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
}

/// A field/operator/value predicate gating action execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    pub value: String,
}

impl Condition {
    pub fn new(field: &str, operator: ConditionOperator, value: &str) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value: value.to_string(),
        }
    }
}

/// Side-effecting operations a rule can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    AssignTicket,
    ChangeStatus,
    ChangePriority,
    AddTag,
    RemoveTag,
    SendEmail,
    SendNotification,
    EscalateTicket,
    AddComment,
}

/// A single configured action with its parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl Action {
    pub fn new(action_type: ActionType) -> Self {
        Self {
            action_type,
            parameters: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.parameters.insert(key.to_string(), value.to_string());
        self
    }
}

/// A stored automation rule: trigger + conditions + actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationRule {
    /// Unique identifier
    pub id: Uuid,
    /// Human-readable name
    pub name: String,
    /// Optional longer description, display only
    #[serde(default)]
    pub description: String,
    /// Event clause the rule responds to
    pub trigger: Trigger,
    /// All conditions must hold; empty list always matches
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Executed in declaration order; empty list is legal and inert
    #[serde(default)]
    pub actions: Vec<Action>,
    /// If non-empty, the ticket's category must be listed here
    #[serde(default)]
    pub categories: Vec<String>,
    /// If non-empty, the ticket must carry at least one of these tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Inactive rules are never evaluated
    pub is_active: bool,
    /// Incremented exactly once per firing, not per action
    pub execution_count: u64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AutomationRule {
    pub fn from_definition(def: RuleDefinition) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: def.name,
            description: def.description,
            trigger: def.trigger,
            conditions: def.conditions,
            actions: def.actions,
            categories: def.categories,
            tags: def.tags,
            is_active: def.is_active,
            execution_count: 0,
            created_by: def.created_by.unwrap_or_else(|| "system".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the mutable parts of the rule with a new definition,
    /// preserving identity, authorship and the execution counter.
    pub fn apply_definition(&mut self, def: RuleDefinition) {
        self.name = def.name;
        self.description = def.description;
        self.trigger = def.trigger;
        self.conditions = def.conditions;
        self.actions = def.actions;
        self.categories = def.categories;
        self.tags = def.tags;
        self.is_active = def.is_active;
        self.updated_at = Utc::now();
    }
}

/// Request body for creating or updating a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub trigger: Trigger,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Read-only view of a ticket used as the field source for condition
/// evaluation. The engine never mutates a snapshot; all mutation goes
/// through the ticket service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketSnapshot {
    pub id: Uuid,
    pub subject: String,
    pub status: String,
    pub priority: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub created_by: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sla_due_at: Option<DateTime<Utc>>,
}

impl TicketSnapshot {
    pub fn new(subject: &str, status: &str, priority: &str, category: &str, created_by: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            subject: subject.to_string(),
            status: status.to_string(),
            priority: priority.to_string(),
            category: category.to_string(),
            assigned_to: None,
            created_by: created_by.to_string(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            sla_due_at: None,
        }
    }

    pub fn with_assignee(mut self, assignee: &str) -> Self {
        self.assigned_to = Some(assignee.to_string());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_sla_due_at(mut self, sla_due_at: DateTime<Utc>) -> Self {
        self.sla_due_at = Some(sla_due_at);
        self
    }
}

/// "from/to" delta carried by `status_changed`, `priority_changed`
/// and `assigned_changed` events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delta {
    pub from: String,
    pub to: String,
}

/// A notification that a ticket changed state, consumed by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    #[serde(rename = "type")]
    pub event_type: TriggerType,
    pub ticket_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,
    /// Minutes since ticket creation, set on scheduler-synthesized events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_minutes: Option<i64>,
    /// Derivation depth; 0 for events from external producers
    #[serde(default)]
    pub depth: u32,
}

impl LifecycleEvent {
    pub fn new(event_type: TriggerType, ticket_id: Uuid) -> Self {
        Self {
            event_type,
            ticket_id,
            delta: None,
            elapsed_minutes: None,
            depth: 0,
        }
    }

    pub fn with_delta(mut self, from: &str, to: &str) -> Self {
        self.delta = Some(Delta {
            from: from.to_string(),
            to: to.to_string(),
        });
        self
    }

    /// Build a follow-up event caused by an action of this pass.
    pub fn derived(&self, event_type: TriggerType, delta: Option<Delta>) -> Self {
        Self {
            event_type,
            ticket_id: self.ticket_id,
            delta,
            elapsed_minutes: None,
            depth: self.depth + 1,
        }
    }
}

/// Per-action observability record returned by the action executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionOutcome {
    pub fn ok(action_type: ActionType) -> Self {
        Self {
            action_type,
            success: true,
            error: None,
        }
    }

    pub fn failed(action_type: ActionType, error: impl Into<String>) -> Self {
        Self {
            action_type,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// An immutable starter configuration a caller can clone into a new rule.
/// Templates ship with the system and are not user-editable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTemplate {
    pub key: String,
    pub name: String,
    pub description: String,
    pub trigger: Trigger,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
}

impl RuleTemplate {
    /// Clone the template into a fresh, inactive rule the caller can edit
    /// and activate.
    pub fn instantiate(&self, created_by: &str) -> AutomationRule {
        AutomationRule::from_definition(RuleDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            trigger: self.trigger.clone(),
            conditions: self.conditions.clone(),
            actions: self.actions.clone(),
            categories: Vec::new(),
            tags: Vec::new(),
            is_active: false,
            created_by: Some(created_by.to_string()),
        })
    }
}

/// Result of a dry run: trigger and condition checks only, no dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOutcome {
    pub matches_trigger: bool,
    pub matches_conditions: bool,
    pub should_execute: bool,
}

/// Request to dry-run a rule against a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRuleRequest {
    pub ticket_id: Uuid,
}

/// Request to clone a template into a new rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloneTemplateRequest {
    #[serde(default)]
    pub created_by: Option<String>,
}
