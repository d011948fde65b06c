//! Condition evaluation.
//!
//! Pure, deterministic, and free of I/O: the evaluator runs once per rule
//! per document-change event, so it must never fail the caller. Every
//! malformed operand pairing degrades to `false`.

use serde::{Deserialize, Serialize};

/// Comparison operator for a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Strict equality, no type coercion.
    #[default]
    Equals,
    /// Strict inequality.
    NotEquals,
    /// Ordering comparison; `false` for non-ordinal operands.
    GreaterThan,
    /// Ordering comparison; `false` for non-ordinal operands.
    LessThan,
    /// Substring match on canonical text representations.
    Contains,
    /// Anything else; always evaluates to `false`.
    #[serde(other)]
    Unknown,
}

/// How per-condition results combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicOp {
    /// All conditions must hold.
    #[default]
    And,
    /// At least one condition must hold.
    Or,
}

/// A single field comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    /// Field name resolved against the evaluation subject.
    pub field: String,

    /// Comparison operator.
    #[serde(default, alias = "op")]
    pub operator: Operator,

    /// Literal comparison value.
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Evaluate one operator against a field value and a comparison value.
///
/// Never panics and never errors: unknown operators and non-ordinal
/// operand pairings return `false`.
pub fn evaluate(
    operator: Operator,
    field_value: &serde_json::Value,
    comparison: &serde_json::Value,
) -> bool {
    match operator {
        Operator::Equals => field_value == comparison,
        Operator::NotEquals => field_value != comparison,
        Operator::GreaterThan => compare_ordinal(field_value, comparison, |o| o.is_gt()),
        Operator::LessThan => compare_ordinal(field_value, comparison, |o| o.is_lt()),
        Operator::Contains => as_text(field_value).contains(&as_text(comparison)),
        Operator::Unknown => false,
    }
}

/// Evaluate a condition set against a JSON object, combining with `logic`.
///
/// Missing fields resolve to null. An empty condition set is vacuously
/// true under both logic operators.
pub fn evaluate_conditions(
    conditions: &[Condition],
    logic: LogicOp,
    subject: &serde_json::Value,
) -> bool {
    if conditions.is_empty() {
        return true;
    }

    let mut check = conditions.iter().map(|c| {
        let field_value = subject
            .as_object()
            .and_then(|obj| obj.get(&c.field))
            .unwrap_or(&serde_json::Value::Null);
        evaluate(c.operator, field_value, &c.value)
    });

    match logic {
        LogicOp::And => check.all(|b| b),
        LogicOp::Or => check.any(|b| b),
    }
}

/// Ordering over the ordinal JSON types: numbers numerically, strings
/// lexicographically. Mixed or non-ordinal operands have no ordering.
fn compare_ordinal<F>(left: &serde_json::Value, right: &serde_json::Value, check: F) -> bool
where
    F: Fn(std::cmp::Ordering) -> bool,
{
    match (left, right) {
        (serde_json::Value::Number(a), serde_json::Value::Number(b)) => {
            match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).map(&check).unwrap_or(false),
                _ => false,
            }
        }
        (serde_json::Value::String(a), serde_json::Value::String(b)) => check(a.cmp(b)),
        _ => false,
    }
}

/// Canonical text representation used by `contains`.
fn as_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
