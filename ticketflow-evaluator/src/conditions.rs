//! Condition evaluation
//!
//! Pure predicate logic over ticket snapshots. Evaluation never fails:
//! unresolvable fields and unparsable numbers make the affected condition
//! false rather than raising an error, so a malformed rule cannot take
//! down evaluation of its siblings.

use std::borrow::Cow;
use ticketflow_core::{Condition, ConditionOperator, TicketSnapshot};

/// Evaluate a rule's condition list against a ticket snapshot.
///
/// All conditions must hold; an empty list is vacuously true.
pub fn evaluate(conditions: &[Condition], ticket: &TicketSnapshot) -> bool {
    conditions.iter().all(|c| evaluate_one(c, ticket))
}

fn evaluate_one(condition: &Condition, ticket: &TicketSnapshot) -> bool {
    let Some(value) = resolve(ticket, &condition.field) else {
        tracing::debug!(field = %condition.field, "condition field did not resolve");
        return false;
    };

    let expected = condition.value.as_str();
    match condition.operator {
        ConditionOperator::Equals => value.as_text() == expected,
        ConditionOperator::NotEquals => value.as_text() != expected,
        ConditionOperator::Contains => value.contains(expected),
        ConditionOperator::NotContains => !value.contains(expected),
        ConditionOperator::GreaterThan => compare_numeric(&value, expected, |a, b| a > b),
        ConditionOperator::LessThan => compare_numeric(&value, expected, |a, b| a < b),
    }
}

/// Resolved view of a snapshot field.
enum FieldValue<'a> {
    Text(&'a str),
    List(&'a [String]),
}

impl FieldValue<'_> {
    fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(*s),
            FieldValue::List(items) => Cow::Owned(items.join(",")),
        }
    }

    /// Substring test on text fields, membership test on list fields.
    fn contains(&self, needle: &str) -> bool {
        match self {
            FieldValue::Text(s) => s.contains(needle),
            FieldValue::List(items) => items.iter().any(|item| item == needle),
        }
    }
}

/// Dotted lookup into the snapshot. An optional `ticket.` prefix is
/// accepted; unknown paths and an unset assignee resolve to nothing.
fn resolve<'a>(ticket: &'a TicketSnapshot, field: &str) -> Option<FieldValue<'a>> {
    let path = field.strip_prefix("ticket.").unwrap_or(field);
    match path {
        "status" => Some(FieldValue::Text(&ticket.status)),
        "priority" => Some(FieldValue::Text(&ticket.priority)),
        "category" => Some(FieldValue::Text(&ticket.category)),
        "subject" => Some(FieldValue::Text(&ticket.subject)),
        "created_by" => Some(FieldValue::Text(&ticket.created_by)),
        "assigned_to" => ticket.assigned_to.as_deref().map(FieldValue::Text),
        "tags" => Some(FieldValue::List(&ticket.tags)),
        _ => None,
    }
}

fn compare_numeric(value: &FieldValue<'_>, expected: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    let (Ok(lhs), Ok(rhs)) = (value.as_text().parse::<f64>(), expected.parse::<f64>()) else {
        return false;
    };
    cmp(lhs, rhs)
}
