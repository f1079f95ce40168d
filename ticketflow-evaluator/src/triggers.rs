//! Trigger matching
//!
//! Decides whether an incoming lifecycle event satisfies a rule's trigger
//! clause. Category/tag scoping is applied by the orchestrator before the
//! matcher runs; the matcher concerns itself only with the trigger.

use ticketflow_core::{LifecycleEvent, Trigger, TriggerType};

/// Whether `event` satisfies `trigger`.
pub fn matches(trigger: &Trigger, event: &LifecycleEvent) -> bool {
    if trigger.trigger_type != event.event_type {
        return false;
    }

    match trigger.trigger_type {
        TriggerType::StatusChanged
        | TriggerType::PriorityChanged
        | TriggerType::AssignedChanged => {
            // transition triggers require the event to carry a delta
            let Some(delta) = &event.delta else {
                return false;
            };
            match trigger.params.get("to") {
                Some(to) => delta.to == *to,
                None => true,
            }
        }
        TriggerType::TimeBased => {
            let Some(elapsed) = event.elapsed_minutes else {
                return false;
            };
            match trigger.params.get("minutes") {
                Some(raw) => raw.parse::<i64>().map_or(false, |threshold| elapsed >= threshold),
                None => true,
            }
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ticket_id() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn event_type_must_match_exactly() {
        let trigger = Trigger::new(TriggerType::TicketCreated);
        let created = LifecycleEvent::new(TriggerType::TicketCreated, ticket_id());
        let updated = LifecycleEvent::new(TriggerType::TicketUpdated, ticket_id());

        assert!(matches(&trigger, &created));
        assert!(!matches(&trigger, &updated));
    }

    #[test]
    fn transition_triggers_require_a_delta() {
        let trigger = Trigger::new(TriggerType::StatusChanged);
        let bare = LifecycleEvent::new(TriggerType::StatusChanged, ticket_id());
        assert!(!matches(&trigger, &bare));

        let with_delta =
            LifecycleEvent::new(TriggerType::StatusChanged, ticket_id()).with_delta("open", "closed");
        assert!(matches(&trigger, &with_delta));
    }

    #[test]
    fn to_param_restricts_the_transition() {
        let trigger = Trigger::new(TriggerType::StatusChanged).with_param("to", "closed");

        let closing =
            LifecycleEvent::new(TriggerType::StatusChanged, ticket_id()).with_delta("open", "closed");
        let reopening =
            LifecycleEvent::new(TriggerType::StatusChanged, ticket_id()).with_delta("closed", "open");

        assert!(matches(&trigger, &closing));
        assert!(!matches(&trigger, &reopening));
    }

    #[test]
    fn time_based_threshold_is_a_minimum() {
        let trigger = Trigger::new(TriggerType::TimeBased).with_param("minutes", "60");

        let mut stale = LifecycleEvent::new(TriggerType::TimeBased, ticket_id());
        stale.elapsed_minutes = Some(90);
        assert!(matches(&trigger, &stale));

        let mut fresh = LifecycleEvent::new(TriggerType::TimeBased, ticket_id());
        fresh.elapsed_minutes = Some(30);
        assert!(!matches(&trigger, &fresh));

        // threshold-less trigger matches any elapsed time
        let any = Trigger::new(TriggerType::TimeBased);
        assert!(matches(&any, &fresh));

        // an event without elapsed time never matches
        let bare = LifecycleEvent::new(TriggerType::TimeBased, ticket_id());
        assert!(!matches(&trigger, &bare));
    }

    #[test]
    fn sla_breach_matches_on_type_alone() {
        let trigger = Trigger::new(TriggerType::SlaBreached);
        let event = LifecycleEvent::new(TriggerType::SlaBreached, ticket_id());
        assert!(matches(&trigger, &event));
    }
}
