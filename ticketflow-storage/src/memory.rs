//! In-memory rule store for development and testing

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use ticketflow_core::AutomationRule;
use uuid::Uuid;

use crate::{RuleStore, StorageError};

/// In-memory rule store for development and testing
pub struct InMemoryRuleStore {
    rules: RwLock<HashMap<Uuid, AutomationRule>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRuleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn save(&self, rule: AutomationRule) -> Result<AutomationRule, StorageError> {
        let mut rules = self.rules.write().unwrap();
        rules.insert(rule.id, rule.clone());
        Ok(rule)
    }

    async fn get(&self, id: Uuid) -> Result<Option<AutomationRule>, StorageError> {
        let rules = self.rules.read().unwrap();
        Ok(rules.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<AutomationRule>, StorageError> {
        let rules = self.rules.read().unwrap();
        let mut all: Vec<_> = rules.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn list_active(&self) -> Result<Vec<AutomationRule>, StorageError> {
        let rules = self.rules.read().unwrap();
        let mut active: Vec<_> = rules.values().filter(|r| r.is_active).cloned().collect();
        active.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(active)
    }

    async fn update(&self, rule: AutomationRule) -> Result<AutomationRule, StorageError> {
        let mut rules = self.rules.write().unwrap();
        if rules.contains_key(&rule.id) {
            rules.insert(rule.id, rule.clone());
            Ok(rule)
        } else {
            Err(StorageError::NotFound(format!(
                "Rule with id {} not found",
                rule.id
            )))
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        let mut rules = self.rules.write().unwrap();
        if rules.remove(&id).is_some() {
            Ok(())
        } else {
            Err(StorageError::NotFound(format!(
                "Rule with id {} not found",
                id
            )))
        }
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<AutomationRule, StorageError> {
        let mut rules = self.rules.write().unwrap();
        match rules.get_mut(&id) {
            Some(rule) => {
                rule.is_active = active;
                rule.updated_at = Utc::now();
                Ok(rule.clone())
            }
            None => Err(StorageError::NotFound(format!(
                "Rule with id {} not found",
                id
            ))),
        }
    }

    async fn increment_execution_count(&self, id: Uuid) -> Result<u64, StorageError> {
        let mut rules = self.rules.write().unwrap();
        match rules.get_mut(&id) {
            Some(rule) => {
                rule.execution_count += 1;
                Ok(rule.execution_count)
            }
            None => Err(StorageError::NotFound(format!(
                "Rule with id {} not found",
                id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketflow_core::{RuleDefinition, Trigger, TriggerType};

    fn rule(name: &str) -> AutomationRule {
        AutomationRule::from_definition(RuleDefinition {
            name: name.to_string(),
            description: String::new(),
            trigger: Trigger::new(TriggerType::TicketCreated),
            conditions: Vec::new(),
            actions: Vec::new(),
            categories: Vec::new(),
            tags: Vec::new(),
            is_active: true,
            created_by: None,
        })
    }

    #[tokio::test]
    async fn test_save_and_get_rule() {
        let store = InMemoryRuleStore::new();
        let saved = store.save(rule("auto-assign")).await.unwrap();
        assert_eq!(saved.execution_count, 0);

        let retrieved = store.get(saved.id).await.unwrap().unwrap();
        assert_eq!(retrieved.id, saved.id);
        assert_eq!(retrieved.name, "auto-assign");
    }

    #[tokio::test]
    async fn test_update_unknown_rule_fails() {
        let store = InMemoryRuleStore::new();
        let result = store.update(rule("ghost")).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_active_filters_inactive() {
        let store = InMemoryRuleStore::new();
        let active = store.save(rule("active")).await.unwrap();
        let mut dormant = rule("dormant");
        dormant.is_active = false;
        store.save(dormant).await.unwrap();

        let listed = store.list_active().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, active.id);

        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_set_active_flips_flag() {
        let store = InMemoryRuleStore::new();
        let saved = store.save(rule("toggle-me")).await.unwrap();

        let updated = store.set_active(saved.id, false).await.unwrap();
        assert!(!updated.is_active);
        assert!(store.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_increment_execution_count() {
        let store = InMemoryRuleStore::new();
        let saved = store.save(rule("counted")).await.unwrap();

        assert_eq!(store.increment_execution_count(saved.id).await.unwrap(), 1);
        assert_eq!(store.increment_execution_count(saved.id).await.unwrap(), 2);

        let retrieved = store.get(saved.id).await.unwrap().unwrap();
        assert_eq!(retrieved.execution_count, 2);
    }
}
