//! API request handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use ticketflow_core::{
    AutomationRule, CloneTemplateRequest, LifecycleEvent, RuleDefinition, TestRuleRequest,
};
use ticketflow_evaluator::validate_rule;
use ticketflow_storage::{builtin_templates, template_by_key};
use uuid::Uuid;

use crate::{ApiError, AppState};

// ==================== Rule Handlers ====================

/// Create a new automation rule
pub async fn create_rule(
    State(state): State<Arc<AppState>>,
    Json(def): Json<RuleDefinition>,
) -> Result<impl IntoResponse, ApiError> {
    validate_rule(&def)?;

    let rule = AutomationRule::from_definition(def);
    let saved = state.rules.save(rule).await?;
    state.orchestrator.invalidate_rules().await;

    tracing::info!("Created rule '{}'", saved.name);

    Ok((StatusCode::CREATED, Json(saved)))
}

/// List all rules
pub async fn list_rules(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let rules = state.rules.list().await?;
    Ok(Json(rules))
}

/// Get a rule by ID
pub async fn get_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rule = state.rules.get(id).await?;

    match rule {
        Some(r) => Ok(Json(r)),
        None => Err(ApiError::NotFound(format!("Rule {} not found", id))),
    }
}

/// Replace a rule's definition, preserving identity and counters
pub async fn update_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(def): Json<RuleDefinition>,
) -> Result<impl IntoResponse, ApiError> {
    validate_rule(&def)?;

    let mut rule = state
        .rules
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Rule {} not found", id)))?;

    rule.apply_definition(def);
    let saved = state.rules.update(rule).await?;
    state.orchestrator.invalidate_rules().await;

    tracing::info!("Updated rule '{}'", saved.name);

    Ok(Json(saved))
}

/// Delete a rule; its execution history goes with it
pub async fn delete_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.rules.delete(id).await?;
    state.orchestrator.invalidate_rules().await;

    tracing::info!("Deleted rule {}", id);

    Ok(StatusCode::NO_CONTENT)
}

/// Flip a rule's active flag
pub async fn toggle_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rule = state
        .rules
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Rule {} not found", id)))?;

    let saved = state.rules.set_active(id, !rule.is_active).await?;
    state.orchestrator.invalidate_rules().await;

    tracing::info!(
        "Rule '{}' {}",
        saved.name,
        if saved.is_active { "activated" } else { "deactivated" }
    );

    Ok(Json(saved))
}

/// Dry-run a rule against a ticket: trigger and condition checks only
pub async fn test_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<TestRuleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.orchestrator.test_rule(id, req.ticket_id).await?;
    Ok(Json(outcome))
}

// ==================== Template Handlers ====================

/// List the built-in rule templates
pub async fn list_templates() -> impl IntoResponse {
    Json(builtin_templates())
}

/// Clone a template into a new, inactive rule
pub async fn clone_template(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    body: Option<Json<CloneTemplateRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let template = template_by_key(&key)
        .ok_or_else(|| ApiError::NotFound(format!("Template '{}' not found", key)))?;

    let created_by = body
        .and_then(|Json(req)| req.created_by)
        .unwrap_or_else(|| "template".to_string());

    let saved = state.rules.save(template.instantiate(&created_by)).await?;
    state.orchestrator.invalidate_rules().await;

    tracing::info!("Cloned template '{}' into rule '{}'", key, saved.name);

    Ok((StatusCode::CREATED, Json(saved)))
}

// ==================== Engine Handlers ====================

/// Accept a lifecycle event from an out-of-process producer
pub async fn ingest_event(
    State(state): State<Arc<AppState>>,
    Json(mut event): Json<LifecycleEvent>,
) -> Result<impl IntoResponse, ApiError> {
    // external producers always enter at depth zero
    event.depth = 0;
    state.events.submit(event).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Engine counters
pub async fn engine_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.orchestrator.stats())
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "ticketflow"
    }))
}
