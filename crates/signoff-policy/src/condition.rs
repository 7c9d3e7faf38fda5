//! Condition evaluation.
//!
//! Two evaluators, both pure and total:
//!
//! - [`evaluate_condition`] checks a statement `Condition` against a subject
//!   record (attribute mode).
//! - [`evaluate_payload`] checks an optional [`PayloadCondition`] against a
//!   plain JSON payload addressed by dotted paths (payload mode).
//!
//! An operator that is not recognised evaluates to `false`; so does a field
//! the subject does not know about.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use signoff_contracts::template::Condition;
use signoff_core::traits::SubjectRecord;

use crate::compare::{loose_cmp, loose_eq};

// ── Operators ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    In,
    NotIn,
}

impl Operator {
    /// Parse the operator token of a condition. `=`/`==` and `!=`/`<>` are
    /// synonyms.
    pub fn parse(token: &str) -> Option<Self> {
        let op = match token {
            "=" | "==" => Self::Eq,
            "!=" | "<>" => Self::Ne,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "<" => Self::Lt,
            "<=" => Self::Le,
            "in" => Self::In,
            "not in" => Self::NotIn,
            _ => return None,
        };
        Some(op)
    }

    /// Apply a scalar comparison. Membership operators are not scalar.
    fn compare(self, left: &Value, right: &Value) -> bool {
        match self {
            Self::Eq => loose_eq(left, right),
            Self::Ne => !loose_eq(left, right),
            Self::Gt => loose_cmp(left, right).is_some_and(|o| o.is_gt()),
            Self::Ge => loose_cmp(left, right).is_some_and(|o| o.is_ge()),
            Self::Lt => loose_cmp(left, right).is_some_and(|o| o.is_lt()),
            Self::Le => loose_cmp(left, right).is_some_and(|o| o.is_le()),
            Self::In | Self::NotIn => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::In => "in",
            Self::NotIn => "not in",
        };
        f.write_str(token)
    }
}

// ── Attribute mode ────────────────────────────────────────────────────────────

/// Evaluate `condition` against `record`.
///
/// The field is read as a plain attribute first, then as a loaded relation
/// and finally as an accessor, the latter two under the camelCase form of the
/// field name. A field none of them resolve fails the condition whatever the
/// operator.
///
/// For `in` / `not in` the literal must be a JSON array; any other literal
/// fails both operators.
pub fn evaluate_condition(condition: &Condition, record: &dyn SubjectRecord) -> bool {
    let Some(operator) = Operator::parse(&condition.operator) else {
        debug!(operator = %condition.operator, field = %condition.field, "unknown condition operator");
        return false;
    };

    let Some(actual) = read_field(record, &condition.field) else {
        debug!(field = %condition.field, "condition field not present on subject");
        return false;
    };

    match operator {
        Operator::In | Operator::NotIn => {
            let Ok(Value::Array(members)) = serde_json::from_str::<Value>(&condition.value) else {
                return false;
            };
            let found = members.iter().any(|m| loose_eq(&actual, m));
            if operator == Operator::In {
                found
            } else {
                !found
            }
        }
        scalar => scalar.compare(&actual, &Value::String(condition.value.clone())),
    }
}

fn read_field(record: &dyn SubjectRecord, field: &str) -> Option<Value> {
    if let Some(value) = record.attribute(field) {
        return Some(value);
    }
    let name = camel_case(field);
    record.relation(&name).or_else(|| record.accessor(&name))
}

/// `"total_amount"` → `"totalAmount"`. Underscores, dashes and spaces all
/// separate words.
pub fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for (i, word) in field
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

// ── Payload mode ──────────────────────────────────────────────────────────────

/// A predicate over a plain JSON payload.
///
/// ```toml
/// field = "order.total"
/// operator = ">="
/// value = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadCondition {
    /// Dotted path into the payload; numeric segments index arrays.
    pub field: String,
    pub operator: String,
    pub value: Value,
}

/// Evaluate an optional payload predicate. No predicate is vacuously true.
///
/// Only the scalar operators `>`, `>=`, `<`, `<=`, `=` and `!=` apply here.
/// A path that does not resolve reads as absent: it satisfies `!=` and
/// nothing else.
pub fn evaluate_payload(condition: Option<&PayloadCondition>, payload: &Value) -> bool {
    let Some(condition) = condition else {
        return true;
    };

    let operator = match condition.operator.as_str() {
        ">" | ">=" | "<" | "<=" | "=" | "!=" => Operator::parse(&condition.operator),
        _ => None,
    };
    let Some(operator) = operator else {
        debug!(operator = %condition.operator, "unsupported payload operator");
        return false;
    };

    match resolve_path(payload, &condition.field) {
        Some(actual) => operator.compare(actual, &condition.value),
        None => operator == Operator::Ne,
    }
}

/// Walk `path` through nested objects and arrays. Null leaves read as absent.
pub fn resolve_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = value;
    for segment in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(v) if !v.is_null() => current = v,
            _ => return None,
        }
    }
    Some(current)
}
