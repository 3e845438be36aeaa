//! Value comparison for in-memory filtering
//!
//! No type coercion. Numbers compare numerically whatever their JSON
//! representation, strings lexicographically, booleans `false < true`.
//! Ordering any other pairing is a type mismatch.

use std::cmp::Ordering;

use serde_json::{Number, Value};

use super::errors::{QueryError, QueryResult};

/// Kind name used in error messages
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Orders `actual` (a stored field value) against `bound` (the literal).
pub fn compare(field: &str, actual: &Value, bound: &Value) -> QueryResult<Ordering> {
    match (actual, bound) {
        (Value::Number(a), Value::Number(b)) => Ok(compare_numbers(a, b)),
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
        _ => Err(QueryError::type_mismatch(
            field,
            kind_name(bound),
            kind_name(actual),
        )),
    }
}

/// Equality without coercion; `30` equals `30.0`.
pub fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b) == Ordering::Equal,
        _ => actual == expected,
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(ai), Some(bi)) = (a.as_i64(), b.as_i64()) {
        return ai.cmp(&bi);
    }
    if let (Some(au), Some(bu)) = (a.as_u64(), b.as_u64()) {
        return au.cmp(&bu);
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(af), Some(bf)) => af.partial_cmp(&bf).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}
