//! End-to-end engine scenarios driven through the orchestrator.

use std::sync::Arc;
use std::time::Duration;

use ticketflow_core::{
    Action, ActionType, AutomationRule, Condition, ConditionOperator, LifecycleEvent,
    RuleDefinition, TicketSnapshot, Trigger, TriggerType,
};
use ticketflow_executor::{InMemoryTicketHub, ServiceCall, TicketService};
use ticketflow_orchestrator::{Orchestrator, OrchestratorConfig};
use ticketflow_storage::{InMemoryRuleStore, RuleStore};

fn rule(
    name: &str,
    trigger: Trigger,
    conditions: Vec<Condition>,
    actions: Vec<Action>,
) -> AutomationRule {
    AutomationRule::from_definition(RuleDefinition {
        name: name.to_string(),
        description: String::new(),
        trigger,
        conditions,
        actions,
        categories: Vec::new(),
        tags: Vec::new(),
        is_active: true,
        created_by: None,
    })
}

fn engine() -> (Arc<InMemoryRuleStore>, Arc<InMemoryTicketHub>, Arc<Orchestrator>) {
    let store = Arc::new(InMemoryRuleStore::new());
    let hub = Arc::new(InMemoryTicketHub::new());
    let orchestrator = Orchestrator::new(
        store.clone(),
        hub.clone(),
        hub.clone(),
        OrchestratorConfig::default(),
    );
    (store, hub, orchestrator)
}

fn urgent_assign() -> AutomationRule {
    rule(
        "assign-urgent",
        Trigger::new(TriggerType::TicketCreated),
        vec![Condition::new("priority", ConditionOperator::Equals, "urgent")],
        vec![Action::new(ActionType::AssignTicket).with_param("assignee", "agent-42")],
    )
}

#[tokio::test]
async fn urgent_ticket_is_assigned_exactly_once() {
    let (store, hub, orchestrator) = engine();
    let saved = store.save(urgent_assign()).await.unwrap();

    let ticket = TicketSnapshot::new("Mail outage", "open", "urgent", "email", "customer-1");
    hub.insert_ticket(ticket.clone());

    orchestrator
        .process_event(LifecycleEvent::new(TriggerType::TicketCreated, ticket.id))
        .await;

    let assigns: Vec<_> = hub
        .calls()
        .into_iter()
        .filter(|c| matches!(c, ServiceCall::Assign { .. }))
        .collect();
    assert_eq!(assigns.len(), 1);
    assert!(matches!(
        &assigns[0],
        ServiceCall::Assign { ticket_id, assignee }
            if *ticket_id == ticket.id && assignee == "agent-42"
    ));

    assert_eq!(store.get(saved.id).await.unwrap().unwrap().execution_count, 1);
}

#[tokio::test]
async fn non_matching_ticket_produces_no_side_effects() {
    let (store, hub, orchestrator) = engine();
    let saved = store.save(urgent_assign()).await.unwrap();

    let ticket = TicketSnapshot::new("Small question", "open", "low", "email", "customer-1");
    hub.insert_ticket(ticket.clone());

    orchestrator
        .process_event(LifecycleEvent::new(TriggerType::TicketCreated, ticket.id))
        .await;

    assert_eq!(hub.call_count(), 0);
    assert_eq!(store.get(saved.id).await.unwrap().unwrap().execution_count, 0);
}

#[tokio::test]
async fn inactive_rule_never_fires() {
    let (store, hub, orchestrator) = engine();
    let mut dormant = urgent_assign();
    dormant.is_active = false;
    let saved = store.save(dormant).await.unwrap();

    let ticket = TicketSnapshot::new("Mail outage", "open", "urgent", "email", "customer-1");
    hub.insert_ticket(ticket.clone());

    orchestrator
        .process_event(LifecycleEvent::new(TriggerType::TicketCreated, ticket.id))
        .await;

    assert_eq!(hub.call_count(), 0);
    assert_eq!(store.get(saved.id).await.unwrap().unwrap().execution_count, 0);
}

#[tokio::test]
async fn partial_action_failure_still_counts_one_firing() {
    let (store, hub, orchestrator) = engine();
    let saved = store
        .save(rule(
            "triage",
            Trigger::new(TriggerType::TicketCreated),
            vec![],
            vec![
                Action::new(ActionType::AddTag), // missing the tag parameter
                Action::new(ActionType::AssignTicket).with_param("assignee", "agent-7"),
                Action::new(ActionType::ChangeStatus).with_param("value", "triaged"),
            ],
        ))
        .await
        .unwrap();

    let ticket = TicketSnapshot::new("Laptop lost", "open", "high", "hardware", "customer-2");
    hub.insert_ticket(ticket.clone());

    orchestrator
        .process_event(LifecycleEvent::new(TriggerType::TicketCreated, ticket.id))
        .await;

    // one firing, not zero and not one per action
    assert_eq!(store.get(saved.id).await.unwrap().unwrap().execution_count, 1);
    assert_eq!(orchestrator.stats().rules_fired, 1);
    assert_eq!(orchestrator.stats().actions_failed, 1);

    // the two well-formed actions still ran
    assert_eq!(hub.call_count(), 2);
    let snapshot = hub.get_snapshot(ticket.id).await.unwrap().unwrap();
    assert_eq!(snapshot.status, "triaged");
    assert_eq!(snapshot.assigned_to.as_deref(), Some("agent-7"));
}

#[tokio::test]
async fn category_scoping_excludes_unrelated_tickets() {
    let (store, hub, orchestrator) = engine();
    let mut scoped = urgent_assign();
    scoped.categories = vec!["billing".to_string()];
    store.save(scoped).await.unwrap();

    let ticket = TicketSnapshot::new("Mail outage", "open", "urgent", "email", "customer-1");
    hub.insert_ticket(ticket.clone());

    orchestrator
        .process_event(LifecycleEvent::new(TriggerType::TicketCreated, ticket.id))
        .await;

    assert_eq!(hub.call_count(), 0);
}

#[tokio::test]
async fn zero_action_rule_fires_but_is_inert() {
    let (store, hub, orchestrator) = engine();
    let saved = store
        .save(rule(
            "watcher",
            Trigger::new(TriggerType::TicketCreated),
            vec![],
            vec![],
        ))
        .await
        .unwrap();

    let ticket = TicketSnapshot::new("Anything", "open", "low", "general", "customer-1");
    hub.insert_ticket(ticket.clone());

    orchestrator
        .process_event(LifecycleEvent::new(TriggerType::TicketCreated, ticket.id))
        .await;

    assert_eq!(hub.call_count(), 0);
    assert_eq!(store.get(saved.id).await.unwrap().unwrap().execution_count, 1);
}

#[tokio::test]
async fn mutual_retrigger_cycle_is_cut_by_the_depth_guard() {
    let (store, hub, orchestrator) = engine();

    // two rules that ping-pong the status between them
    store
        .save(rule(
            "ping",
            Trigger::new(TriggerType::StatusChanged).with_param("to", "ping"),
            vec![],
            vec![Action::new(ActionType::ChangeStatus).with_param("value", "pong")],
        ))
        .await
        .unwrap();
    store
        .save(rule(
            "pong",
            Trigger::new(TriggerType::StatusChanged).with_param("to", "pong"),
            vec![],
            vec![Action::new(ActionType::ChangeStatus).with_param("value", "ping")],
        ))
        .await
        .unwrap();

    let ticket = TicketSnapshot::new("Looper", "ping", "low", "general", "customer-1");
    hub.insert_ticket(ticket.clone());

    orchestrator.clone().start();
    orchestrator
        .sender()
        .submit(
            LifecycleEvent::new(TriggerType::StatusChanged, ticket.id).with_delta("open", "ping"),
        )
        .await
        .unwrap();

    let mut tripped = false;
    for _ in 0..500 {
        if orchestrator.stats().loop_guard_trips >= 1 {
            tripped = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(tripped, "loop guard did not trip within the wait budget");

    // depth 0 through the limit each fired once, then the chain was cut
    let stats = orchestrator.stats();
    assert_eq!(stats.loop_guard_trips, 1);
    assert_eq!(stats.rules_fired, 6);
}
