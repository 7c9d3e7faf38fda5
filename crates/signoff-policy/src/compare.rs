//! Loose comparison of JSON values.
//!
//! Subject attributes arrive as typed JSON while condition literals are
//! strings, so comparison has to coerce. The rules:
//!
//! - two numeric operands (numbers, or strings that parse as finite numbers)
//!   compare as numbers
//! - a bool or null on either side compares by truthiness
//! - anything else compares as strings
//!
//! Arrays and objects are equal only to structurally loose-equal peers and
//! never order against anything.

use std::cmp::Ordering;

use serde_json::Value;

/// Loose equality.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loose_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(k, x)| b.get(k).is_some_and(|y| loose_eq(x, y)))
        }
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => false,
        _ => loose_cmp(left, right) == Some(Ordering::Equal),
    }
}

/// Loose ordering. `None` when the operands cannot be ordered.
pub fn loose_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    if matches!(left, Value::Array(_) | Value::Object(_))
        || matches!(right, Value::Array(_) | Value::Object(_))
    {
        return None;
    }

    if matches!(left, Value::Bool(_) | Value::Null) || matches!(right, Value::Bool(_) | Value::Null) {
        return Some(truthy(left).cmp(&truthy(right)));
    }

    if let (Some(a), Some(b)) = (numeric(left), numeric(right)) {
        return a.partial_cmp(&b);
    }

    Some(scalar_text(left).cmp(&scalar_text(right)))
}

/// The numeric reading of a scalar, if it has one.
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            // Rejects "inf", "NaN" and friends that f64 parsing would accept.
            if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Truthiness: null, false, 0, "", "0" and empty arrays are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
