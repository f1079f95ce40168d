//! Built-in rule template library
//!
//! Starter configurations a caller can clone into a new rule. The set
//! ships with the system and is read-only.

use ticketflow_core::{
    Action, ActionType, Condition, ConditionOperator, RuleTemplate, Trigger, TriggerType,
};

/// All templates shipped with the system.
pub fn builtin_templates() -> Vec<RuleTemplate> {
    vec![
        urgent_triage(),
        sla_escalation(),
        stale_ticket_nudge(),
        comment_notification(),
        billing_autotag(),
    ]
}

/// Look up a single template by its key.
pub fn template_by_key(key: &str) -> Option<RuleTemplate> {
    builtin_templates().into_iter().find(|t| t.key == key)
}

fn urgent_triage() -> RuleTemplate {
    RuleTemplate {
        key: "urgent-triage".to_string(),
        name: "Escalate urgent tickets on arrival".to_string(),
        description: "New urgent tickets are escalated and the team is notified".to_string(),
        trigger: Trigger::new(TriggerType::TicketCreated),
        conditions: vec![Condition::new(
            "priority",
            ConditionOperator::Equals,
            "urgent",
        )],
        actions: vec![
            Action::new(ActionType::EscalateTicket),
            Action::new(ActionType::SendNotification)
                .with_param("message", "Urgent ticket needs triage: {{ticket.subject}}"),
        ],
    }
}

fn sla_escalation() -> RuleTemplate {
    RuleTemplate {
        key: "sla-escalation".to_string(),
        name: "Escalate SLA breaches".to_string(),
        description: "Tickets past their SLA deadline are escalated, tagged and reported"
            .to_string(),
        trigger: Trigger::new(TriggerType::SlaBreached),
        conditions: Vec::new(),
        actions: vec![
            Action::new(ActionType::EscalateTicket),
            Action::new(ActionType::AddTag).with_param("tag", "sla-breach"),
            Action::new(ActionType::SendEmail).with_param("template", "sla_breach"),
        ],
    }
}

fn stale_ticket_nudge() -> RuleTemplate {
    RuleTemplate {
        key: "stale-ticket-nudge".to_string(),
        name: "Nudge stale open tickets".to_string(),
        description: "Tickets open for more than a day get a reminder comment".to_string(),
        trigger: Trigger::new(TriggerType::TimeBased).with_param("minutes", "1440"),
        conditions: vec![Condition::new("status", ConditionOperator::Equals, "open")],
        actions: vec![Action::new(ActionType::AddComment).with_param(
            "comment",
            "This ticket has been open for over a day without resolution.",
        )],
    }
}

fn comment_notification() -> RuleTemplate {
    RuleTemplate {
        key: "comment-notification".to_string(),
        name: "Notify assignee of new comments".to_string(),
        description: "The current assignee is notified whenever a comment is added".to_string(),
        trigger: Trigger::new(TriggerType::CommentAdded),
        conditions: Vec::new(),
        actions: vec![Action::new(ActionType::SendNotification)
            .with_param("message", "New comment on {{ticket.subject}}")],
    }
}

fn billing_autotag() -> RuleTemplate {
    RuleTemplate {
        key: "billing-autotag".to_string(),
        name: "Tag billing tickets".to_string(),
        description: "Tickets mentioning billing in the subject are tagged for the billing team"
            .to_string(),
        trigger: Trigger::new(TriggerType::TicketCreated),
        conditions: vec![Condition::new(
            "subject",
            ConditionOperator::Contains,
            "billing",
        )],
        actions: vec![Action::new(ActionType::AddTag).with_param("tag", "billing")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_template_keys_are_unique() {
        let templates = builtin_templates();
        let keys: HashSet<_> = templates.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys.len(), templates.len());
    }

    #[test]
    fn test_template_lookup() {
        assert!(template_by_key("sla-escalation").is_some());
        assert!(template_by_key("does-not-exist").is_none());
    }

    #[test]
    fn test_instantiated_rule_starts_inactive() {
        let template = template_by_key("urgent-triage").unwrap();
        let rule = template.instantiate("agent-1");

        assert!(!rule.is_active);
        assert_eq!(rule.execution_count, 0);
        assert_eq!(rule.created_by, "agent-1");
        assert_eq!(rule.name, template.name);
        assert_eq!(rule.actions.len(), template.actions.len());
    }
}
