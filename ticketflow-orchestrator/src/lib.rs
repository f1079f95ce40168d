//! Automation orchestrator for Ticketflow
//!
//! Top-level coordinator: consumes lifecycle events, fans them out to
//! active rules through the evaluator, dispatches matched rules' actions
//! through the executor, and runs the periodic time/SLA scan. Also
//! exposes the synchronous dry-run used by the management API.

pub mod error;
pub mod orchestrator;
pub mod scheduler;

pub use error::OrchestratorError;
pub use orchestrator::{
    EventSender, Orchestrator, OrchestratorConfig, StatsSnapshot,
};
