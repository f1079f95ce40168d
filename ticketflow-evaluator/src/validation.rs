//! Definition-time rule validation
//!
//! Runs before a rule is persisted, so bad definitions surface as
//! validation errors to the caller instead of as silent no-ops at
//! evaluation time.

use ticketflow_core::{RuleDefinition, TriggerType};

use crate::ValidationError;

/// Validate a rule definition prior to create/update.
pub fn validate_rule(def: &RuleDefinition) -> Result<(), ValidationError> {
    if def.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }

    if def.trigger.trigger_type == TriggerType::TimeBased {
        if let Some(minutes) = def.trigger.params.get("minutes") {
            if minutes.parse::<i64>().map_or(true, |m| m < 0) {
                return Err(ValidationError::InvalidTriggerParam {
                    param: "minutes",
                    value: minutes.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketflow_core::Trigger;

    fn definition(name: &str, trigger: Trigger) -> RuleDefinition {
        RuleDefinition {
            name: name.to_string(),
            description: String::new(),
            trigger,
            conditions: Vec::new(),
            actions: Vec::new(),
            categories: Vec::new(),
            tags: Vec::new(),
            is_active: true,
            created_by: None,
        }
    }

    #[test]
    fn accepts_a_minimal_definition() {
        let def = definition("notify", Trigger::new(TriggerType::CommentAdded));
        assert!(validate_rule(&def).is_ok());
    }

    #[test]
    fn rejects_blank_names() {
        let def = definition("   ", Trigger::new(TriggerType::TicketCreated));
        assert!(matches!(validate_rule(&def), Err(ValidationError::EmptyName)));
    }

    #[test]
    fn rejects_non_numeric_time_thresholds() {
        let trigger = Trigger::new(TriggerType::TimeBased).with_param("minutes", "soon");
        let def = definition("stale", trigger);
        assert!(matches!(
            validate_rule(&def),
            Err(ValidationError::InvalidTriggerParam { param: "minutes", .. })
        ));
    }

    #[test]
    fn rejects_negative_time_thresholds() {
        let trigger = Trigger::new(TriggerType::TimeBased).with_param("minutes", "-5");
        let def = definition("stale", trigger);
        assert!(validate_rule(&def).is_err());
    }

    #[test]
    fn time_based_without_threshold_is_legal() {
        let def = definition("any-tick", Trigger::new(TriggerType::TimeBased));
        assert!(validate_rule(&def).is_ok());
    }
}
