//! Application state shared across handlers

use std::sync::Arc;

use ticketflow_executor::{InMemoryTicketHub, NotificationService, TicketService};
use ticketflow_orchestrator::{EventSender, Orchestrator, OrchestratorConfig};
use ticketflow_storage::{InMemoryRuleStore, RuleStore};

/// Shared application state
pub struct AppState {
    pub rules: Arc<dyn RuleStore>,
    pub orchestrator: Arc<Orchestrator>,
    pub events: EventSender,
}

impl AppState {
    /// In-memory backends with default engine settings.
    pub fn new() -> Arc<Self> {
        let hub = Arc::new(InMemoryTicketHub::new());
        Self::with_backends(
            Arc::new(InMemoryRuleStore::new()),
            hub.clone(),
            hub,
            OrchestratorConfig::default(),
        )
    }

    /// Create with custom backends; the caller keeps its own handles for
    /// wiring the surrounding application.
    pub fn with_backends(
        rules: Arc<dyn RuleStore>,
        tickets: Arc<dyn TicketService>,
        notifications: Arc<dyn NotificationService>,
        config: OrchestratorConfig,
    ) -> Arc<Self> {
        let orchestrator = Orchestrator::new(rules.clone(), tickets, notifications, config);
        let events = orchestrator.sender();

        Arc::new(Self {
            rules,
            orchestrator,
            events,
        })
    }

    /// Start the event loop and the time/SLA scan.
    pub fn start_engine(&self) {
        self.orchestrator.clone().start();
        self.orchestrator.clone().start_scheduler();
    }
}
