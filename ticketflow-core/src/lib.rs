//! Core domain models for Ticketflow
//!
//! This crate contains the shared data structures used across the
//! automation engine: AutomationRule, triggers, conditions, actions,
//! ticket snapshots and lifecycle events.

pub mod models;

pub use models::*;
