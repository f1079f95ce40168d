//! Storage traits defining the interface for rule persistence

use async_trait::async_trait;
use ticketflow_core::AutomationRule;
use uuid::Uuid;

use crate::StorageError;

/// Trait for automation rule storage operations
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Save a new rule
    async fn save(&self, rule: AutomationRule) -> Result<AutomationRule, StorageError>;

    /// Get a rule by ID
    async fn get(&self, id: Uuid) -> Result<Option<AutomationRule>, StorageError>;

    /// List all rules
    async fn list(&self) -> Result<Vec<AutomationRule>, StorageError>;

    /// List rules with the active flag set
    async fn list_active(&self) -> Result<Vec<AutomationRule>, StorageError>;

    /// Update an existing rule
    async fn update(&self, rule: AutomationRule) -> Result<AutomationRule, StorageError>;

    /// Delete a rule; its execution counter is discarded with it
    async fn delete(&self, id: Uuid) -> Result<(), StorageError>;

    /// Flip the active flag without touching the rest of the definition
    async fn set_active(&self, id: Uuid, active: bool) -> Result<AutomationRule, StorageError>;

    /// Increment the execution counter in place and return the new value.
    /// The increment happens under the store's own lock so concurrent
    /// firings of the same rule never lose updates.
    async fn increment_execution_count(&self, id: Uuid) -> Result<u64, StorageError>;
}
