//! Periodic time/SLA scan
//!
//! `time_based` and `sla_breached` triggers are not event-driven: a
//! recurring scan walks the open tickets, measures elapsed time and SLA
//! state, and synthesizes lifecycle events that flow through the same
//! orchestration pass as everything else.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use ticketflow_core::{LifecycleEvent, TriggerType};

use crate::{Orchestrator, OrchestratorError};

impl Orchestrator {
    /// Start the recurring scan alongside the event loop.
    pub fn start_scheduler(self: Arc<Self>) -> JoinHandle<()> {
        let this = self;

        tokio::spawn(async move {
            let mut ticks = IntervalStream::new(tokio::time::interval(this.scan_interval()));
            // the first tick fires immediately; skip it so startup isn't a scan
            ticks.next().await;

            while ticks.next().await.is_some() {
                if let Err(err) = this.scan_open_tickets().await {
                    tracing::warn!(error = %err, "time-based scan failed");
                }
            }
        })
    }

    /// One scan pass over the open tickets.
    pub async fn scan_open_tickets(&self) -> Result<(), OrchestratorError> {
        let now = Utc::now();
        let open = self.tickets().list_open_tickets().await?;
        tracing::debug!(tickets = open.len(), "scanning open tickets");

        for ticket in open {
            let elapsed = (now - ticket.created_at).num_minutes();
            let mut event = LifecycleEvent::new(TriggerType::TimeBased, ticket.id);
            event.elapsed_minutes = Some(elapsed);
            self.process_event(event).await;

            if ticket.sla_due_at.is_some_and(|due| now > due) {
                self.process_event(LifecycleEvent::new(TriggerType::SlaBreached, ticket.id))
                    .await;
            }
        }

        Ok(())
    }
}
