//! Automation orchestrator
//!
//! Subscribes to lifecycle events, fans each event out to every active
//! rule, and runs the trigger, condition and action stages per rule.
//! Each event is processed on its own task; derived events caused by rule
//! actions are queued onto the same channel, never evaluated inline, and
//! carry a depth counter that bounds trigger loops.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use ticketflow_core::{
    AutomationRule, Delta, LifecycleEvent, TestOutcome, TicketSnapshot, Trigger, TriggerType,
};
use ticketflow_evaluator::{conditions, triggers};
use ticketflow_executor::{ActionExecutor, NotificationService, TicketService};
use ticketflow_storage::RuleStore;

use crate::OrchestratorError;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum derivation depth before a derived event is dropped
    pub max_derived_depth: u32,
    /// Period of the time/SLA scan
    pub scan_interval: Duration,
    /// Per-action timeout for external calls
    pub action_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_derived_depth: 5,
            scan_interval: Duration::from_secs(60),
            action_timeout: Duration::from_secs(5),
        }
    }
}

/// Handle the ticket-mutation code path uses to push lifecycle events
/// into the engine.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<LifecycleEvent>,
}

impl EventSender {
    pub async fn submit(&self, event: LifecycleEvent) -> Result<(), OrchestratorError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| OrchestratorError::EngineStopped)
    }
}

/// Monotonic engine counters.
#[derive(Default)]
pub struct EngineStats {
    events_processed: AtomicU64,
    rules_fired: AtomicU64,
    actions_failed: AtomicU64,
    loop_guard_trips: AtomicU64,
}

/// Point-in-time view of the engine counters.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub events_processed: u64,
    pub rules_fired: u64,
    pub actions_failed: u64,
    pub loop_guard_trips: u64,
}

pub struct Orchestrator {
    rules: Arc<dyn RuleStore>,
    tickets: Arc<dyn TicketService>,
    executor: ActionExecutor,
    config: OrchestratorConfig,
    /// Snapshot of active rules shared by in-flight passes; cleared on
    /// rule mutation and reloaded on the next event.
    rule_cache: RwLock<Option<Arc<Vec<AutomationRule>>>>,
    tx: mpsc::Sender<LifecycleEvent>,
    rx: Mutex<Option<mpsc::Receiver<LifecycleEvent>>>,
    stats: EngineStats,
}

impl Orchestrator {
    pub fn new(
        rules: Arc<dyn RuleStore>,
        tickets: Arc<dyn TicketService>,
        notifications: Arc<dyn NotificationService>,
        config: OrchestratorConfig,
    ) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let executor =
            ActionExecutor::new(tickets.clone(), notifications).with_timeout(config.action_timeout);

        Arc::new(Self {
            rules,
            tickets,
            executor,
            config,
            rule_cache: RwLock::new(None),
            tx,
            rx: Mutex::new(Some(rx)),
            stats: EngineStats::default(),
        })
    }

    /// Subscription handle for lifecycle event producers.
    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            events_processed: self.stats.events_processed.load(Ordering::Relaxed),
            rules_fired: self.stats.rules_fired.load(Ordering::Relaxed),
            actions_failed: self.stats.actions_failed.load(Ordering::Relaxed),
            loop_guard_trips: self.stats.loop_guard_trips.load(Ordering::Relaxed),
        }
    }

    /// Drop the cached rule snapshot. Called by the management API after
    /// any rule mutation; in-flight passes keep their stale snapshot.
    pub async fn invalidate_rules(&self) {
        *self.rule_cache.write().await = None;
    }

    /// Start the event loop. Each received event runs on its own task so
    /// a slow external service never blocks other tickets.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        let mut rx = self
            .rx
            .lock()
            .take()
            .expect("orchestrator event loop already started");
        let this = self;

        tokio::spawn(async move {
            tracing::info!("automation engine started");
            while let Some(event) = rx.recv().await {
                let this = Arc::clone(&this);
                tokio::spawn(async move {
                    this.process_event(event).await;
                });
            }
            tracing::info!("automation engine stopped");
        })
    }

    /// Run one full orchestration pass for a lifecycle event.
    pub async fn process_event(&self, event: LifecycleEvent) {
        self.stats.events_processed.fetch_add(1, Ordering::Relaxed);

        let ticket = match self.tickets.get_snapshot(event.ticket_id).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::debug!(ticket_id = %event.ticket_id, "ticket gone, event skipped");
                return;
            }
            Err(err) => {
                tracing::warn!(ticket_id = %event.ticket_id, error = %err, "snapshot fetch failed");
                return;
            }
        };

        let rules = match self.active_rules().await {
            Ok(rules) => rules,
            Err(err) => {
                tracing::error!(error = %err, "active rule fetch failed, event skipped");
                return;
            }
        };

        for rule in rules.iter() {
            self.run_pass(rule, &event, &ticket).await;
        }
    }

    async fn run_pass(&self, rule: &AutomationRule, event: &LifecycleEvent, ticket: &TicketSnapshot) {
        if !in_scope(rule, ticket) {
            return;
        }
        if !triggers::matches(&rule.trigger, event) {
            return;
        }
        if !conditions::evaluate(&rule.conditions, ticket) {
            return;
        }

        let outcomes = self.executor.execute(&rule.actions, ticket, rule.id).await;
        let failed = outcomes.iter().filter(|o| !o.success).count();
        self.stats
            .actions_failed
            .fetch_add(failed as u64, Ordering::Relaxed);

        // the rule fired once, regardless of per-action outcomes
        match self.rules.increment_execution_count(rule.id).await {
            Ok(count) => {
                self.stats.rules_fired.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    rule = %rule.name,
                    rule_id = %rule.id,
                    ticket_id = %ticket.id,
                    actions = outcomes.len(),
                    failed,
                    execution_count = count,
                    "rule fired"
                );
            }
            Err(err) => {
                tracing::warn!(rule_id = %rule.id, error = %err, "execution count update failed");
            }
        }

        self.queue_derived_events(rule, event, ticket).await;
    }

    /// Successful mutating actions are mirrored as new lifecycle events so
    /// other rules can react, one derivation level deeper.
    async fn queue_derived_events(
        &self,
        rule: &AutomationRule,
        event: &LifecycleEvent,
        ticket: &TicketSnapshot,
    ) {
        use ticketflow_core::ActionType;

        for action in &rule.actions {
            let derived = match action.action_type {
                ActionType::ChangeStatus => action
                    .parameters
                    .get("value")
                    .filter(|to| **to != ticket.status)
                    .map(|to| {
                        event.derived(
                            TriggerType::StatusChanged,
                            Some(Delta {
                                from: ticket.status.clone(),
                                to: to.clone(),
                            }),
                        )
                    }),
                ActionType::ChangePriority => action
                    .parameters
                    .get("value")
                    .filter(|to| **to != ticket.priority)
                    .map(|to| {
                        event.derived(
                            TriggerType::PriorityChanged,
                            Some(Delta {
                                from: ticket.priority.clone(),
                                to: to.clone(),
                            }),
                        )
                    }),
                ActionType::AssignTicket => action.parameters.get("assignee").map(|to| {
                    event.derived(
                        TriggerType::AssignedChanged,
                        Some(Delta {
                            from: ticket
                                .assigned_to
                                .clone()
                                .unwrap_or_else(|| "unassigned".to_string()),
                            to: to.clone(),
                        }),
                    )
                }),
                _ => None,
            };

            if let Some(derived) = derived {
                self.enqueue_derived(rule, derived).await;
            }
        }
    }

    async fn enqueue_derived(&self, rule: &AutomationRule, event: LifecycleEvent) {
        if event.depth > self.config.max_derived_depth {
            self.stats.loop_guard_trips.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                rule = %rule.name,
                rule_id = %rule.id,
                ticket_id = %event.ticket_id,
                depth = event.depth,
                "derived event dropped: rule cycle exceeded depth limit"
            );
            return;
        }

        if self.tx.send(event).await.is_err() {
            tracing::debug!("engine stopped, derived event dropped");
        }
    }

    /// Dry run: trigger and condition checks only, no dispatch, no
    /// counter updates. Scheduler-matched triggers are treated as matched
    /// by construction since no live event exists to check against.
    pub async fn test_rule(
        &self,
        rule_id: Uuid,
        ticket_id: Uuid,
    ) -> Result<TestOutcome, OrchestratorError> {
        let rule = self
            .rules
            .get(rule_id)
            .await?
            .ok_or(OrchestratorError::RuleNotFound(rule_id))?;
        let ticket = self
            .tickets
            .get_snapshot(ticket_id)
            .await?
            .ok_or(OrchestratorError::TicketNotFound(ticket_id))?;

        let matches_trigger = match rule.trigger.trigger_type {
            TriggerType::TimeBased | TriggerType::SlaBreached => true,
            _ => triggers::matches(&rule.trigger, &probe_event(&rule.trigger, &ticket)),
        };
        let matches_conditions = conditions::evaluate(&rule.conditions, &ticket);

        Ok(TestOutcome {
            matches_trigger,
            matches_conditions,
            should_execute: matches_trigger && matches_conditions,
        })
    }

    pub(crate) fn tickets(&self) -> &Arc<dyn TicketService> {
        &self.tickets
    }

    pub(crate) fn scan_interval(&self) -> Duration {
        self.config.scan_interval
    }

    async fn active_rules(&self) -> Result<Arc<Vec<AutomationRule>>, OrchestratorError> {
        if let Some(rules) = self.rule_cache.read().await.as_ref() {
            return Ok(Arc::clone(rules));
        }

        let mut cache = self.rule_cache.write().await;
        // another pass may have repopulated the cache while we waited
        if let Some(rules) = cache.as_ref() {
            return Ok(Arc::clone(rules));
        }

        let rules = Arc::new(self.rules.list_active().await?);
        *cache = Some(Arc::clone(&rules));
        tracing::debug!(rules = rules.len(), "active rule snapshot loaded");
        Ok(rules)
    }
}

/// Category/tag scoping: a non-empty set restricts the rule to tickets
/// intersecting it.
fn in_scope(rule: &AutomationRule, ticket: &TicketSnapshot) -> bool {
    let category_ok =
        rule.categories.is_empty() || rule.categories.iter().any(|c| *c == ticket.category);
    let tags_ok = rule.tags.is_empty() || rule.tags.iter().any(|t| ticket.tags.contains(t));
    category_ok && tags_ok
}

/// Synthetic event mirroring the rule's own trigger, used by the dry run.
fn probe_event(trigger: &Trigger, ticket: &TicketSnapshot) -> LifecycleEvent {
    let mut event = LifecycleEvent::new(trigger.trigger_type, ticket.id);
    event.delta = match trigger.trigger_type {
        TriggerType::StatusChanged => Some(Delta {
            from: ticket.status.clone(),
            to: trigger
                .params
                .get("to")
                .cloned()
                .unwrap_or_else(|| ticket.status.clone()),
        }),
        TriggerType::PriorityChanged => Some(Delta {
            from: ticket.priority.clone(),
            to: trigger
                .params
                .get("to")
                .cloned()
                .unwrap_or_else(|| ticket.priority.clone()),
        }),
        TriggerType::AssignedChanged => {
            let current = ticket
                .assigned_to
                .clone()
                .unwrap_or_else(|| "unassigned".to_string());
            Some(Delta {
                from: current.clone(),
                to: trigger.params.get("to").cloned().unwrap_or(current),
            })
        }
        _ => None,
    };
    event
}
