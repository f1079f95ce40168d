//! Definition validation error types

use thiserror::Error;

/// A rule definition that must never reach the store.
///
/// Unknown trigger, operator and action names are already rejected at the
/// serialization boundary; these are the checks that need the whole
/// definition in hand.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("rule name must not be empty")]
    EmptyName,

    #[error("trigger parameter '{param}' must be a number, got '{value}'")]
    InvalidTriggerParam { param: &'static str, value: String },
}
