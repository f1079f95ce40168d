//! Orchestrator error types

use thiserror::Error;
use ticketflow_executor::ServiceError;
use ticketflow_storage::StorageError;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Rule {0} not found")]
    RuleNotFound(Uuid),

    #[error("Ticket {0} not found")]
    TicketNotFound(Uuid),

    #[error("Engine stopped")]
    EngineStopped,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}
