//! Value helpers shared by the parser and the interpreter.
//!
//! Plan values are plain `serde_json::Value`s. This module owns the few
//! semantic rules the language layers on top of JSON: how numeric text
//! becomes a number, numeric-aware equality, ordering, and path indexing.

use crate::ast::{CmpOp, IndexStep};
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Parse numeric literal text (`42`, `-3.5`, `1.`) into a JSON number.
///
/// Text without a decimal point that fits in `i64` stays an integer;
/// anything else goes through `f64`. Returns `None` for non-numeric text,
/// including the `inf`/`NaN` spellings `f64::from_str` would otherwise accept.
pub fn number_from_text(text: &str) -> Option<Number> {
    let looks_numeric = !text.is_empty()
        && text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
    if !looks_numeric {
        return None;
    }
    if !text.contains(&['.', 'e', 'E'][..]) {
        if let Ok(i) = text.parse::<i64>() {
            return Some(Number::from(i));
        }
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Structural equality where numbers compare by numeric value (`2 == 2.0`).
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => a.as_f64() == b.as_f64(),
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(k, v)| b.get(k).map_or(false, |other| values_equal(v, other)))
        }
        _ => left == right,
    }
}

/// Native ordering between two values of the same scalar type.
///
/// Numbers order numerically, strings lexicographically, booleans
/// `false < true`. Anything else (mixed types, arrays, maps) is unordered.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Apply a comparison operator to two resolved values.
///
/// A null operand only takes part in equality: `==`/`!=` test whether both
/// sides are null. Ordering operators against a single null are false; with
/// null on both sides `<=`/`>=` hold and `<`/`>` do not.
pub fn compare(op: CmpOp, left: &Value, right: &Value) -> bool {
    match op {
        CmpOp::Eq => values_equal(left, right),
        CmpOp::Ne => !values_equal(left, right),
        _ if left.is_null() && right.is_null() => matches!(op, CmpOp::Le | CmpOp::Ge),
        _ if left.is_null() || right.is_null() => false,
        _ => match compare_values(left, right) {
            Some(ordering) => match op {
                CmpOp::Lt => ordering == Ordering::Less,
                CmpOp::Le => ordering != Ordering::Greater,
                CmpOp::Gt => ordering == Ordering::Greater,
                CmpOp::Ge => ordering != Ordering::Less,
                CmpOp::Eq => ordering == Ordering::Equal,
                CmpOp::Ne => ordering != Ordering::Equal,
            },
            None => false,
        },
    }
}

/// Index one step into a value. Misses of any kind yield null.
pub fn index_value(value: &Value, step: &IndexStep) -> Value {
    match (value, step) {
        (Value::Array(items), IndexStep::Position(i)) => usize::try_from(*i)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or(Value::Null),
        (Value::Object(map), IndexStep::Position(i)) => {
            map.get(&i.to_string()).cloned().unwrap_or(Value::Null)
        }
        (Value::Object(map), IndexStep::Key(key)) => map.get(key).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Short type label used in runtime error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_from_text() {
        assert_eq!(number_from_text("42"), Some(Number::from(42)));
        assert_eq!(number_from_text("-7"), Some(Number::from(-7)));
        assert_eq!(number_from_text("2.5").and_then(|n| n.as_f64()), Some(2.5));
        assert_eq!(number_from_text("1.").and_then(|n| n.as_f64()), Some(1.0));
        assert_eq!(number_from_text("inf"), None);
        assert_eq!(number_from_text("NaN"), None);
        assert_eq!(number_from_text("abc"), None);
        assert_eq!(number_from_text(""), None);
    }

    #[test]
    fn test_numeric_equality_ignores_representation() {
        assert!(values_equal(&json!(2), &json!(2.0)));
        assert!(values_equal(&json!([1, {"a": 2}]), &json!([1.0, {"a": 2}])));
        assert!(!values_equal(&json!("2"), &json!(2)));
    }

    #[test]
    fn test_null_comparisons() {
        assert!(compare(CmpOp::Eq, &Value::Null, &Value::Null));
        assert!(compare(CmpOp::Ne, &Value::Null, &json!(0)));
        assert!(!compare(CmpOp::Lt, &Value::Null, &json!(1)));
        assert!(!compare(CmpOp::Ge, &json!(1), &Value::Null));
        assert!(compare(CmpOp::Le, &Value::Null, &Value::Null));
        assert!(!compare(CmpOp::Lt, &Value::Null, &Value::Null));
    }

    #[test]
    fn test_ordering_operators() {
        assert!(compare(CmpOp::Lt, &json!(1), &json!(1.5)));
        assert!(compare(CmpOp::Ge, &json!("b"), &json!("a")));
        assert!(compare(CmpOp::Gt, &json!(true), &json!(false)));
        assert!(!compare(CmpOp::Lt, &json!(1), &json!("2")));
        assert!(!compare(CmpOp::Lt, &json!([1]), &json!([2])));
    }

    #[test]
    fn test_index_value() {
        let v = json!({"items": [10, 20], "0": "zero"});
        assert_eq!(index_value(&v, &IndexStep::Key("items".into())), json!([10, 20]));
        assert_eq!(index_value(&v, &IndexStep::Position(0)), json!("zero"));
        assert_eq!(index_value(&json!([10, 20]), &IndexStep::Position(1)), json!(20));
        assert_eq!(index_value(&json!([10, 20]), &IndexStep::Position(5)), Value::Null);
        assert_eq!(index_value(&json!([10, 20]), &IndexStep::Position(-1)), Value::Null);
        assert_eq!(index_value(&json!("text"), &IndexStep::Position(0)), Value::Null);
    }
}
