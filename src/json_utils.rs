//! Optional-field accessors over loosely structured tweet/user JSON.
//! Absent or mistyped fields read as empty; nothing here fails.

use serde_json::{Map, Value};

/// One flat JSON object: a raw post, a raw author or a cleaned row.
pub type Row = Map<String, Value>;

/// Join delimiter for multi-valued flattened columns.
pub const DELIMITER: &str = ", ";

/// String form of an identifier cell: strings as-is, numbers via `to_string`.
pub fn key_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Identifier of `row[field]`, if present and scalar.
pub fn row_key(row: &Row, field: &str) -> Option<String> {
    row.get(field).and_then(key_string)
}

/// Text-like view of a scalar cell (strings, numbers, booleans).
pub fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Object items of an array cell; missing/null/non-array → empty.
pub fn objects(v: Option<&Value>) -> Vec<&Row> {
    v.and_then(|x| x.as_array())
        .map(|items| items.iter().filter_map(|i| i.as_object()).collect())
        .unwrap_or_default()
}

/// `v[field]` as an array of objects; see [`objects`].
pub fn object_list<'a>(v: Option<&'a Value>, field: &str) -> Vec<&'a Row> {
    objects(v.and_then(|x| x.get(field)))
}

/// `item[field]` for every item that has it, as text.
pub fn pluck(items: &[&Row], field: &str) -> Vec<String> {
    items.iter().filter_map(|i| i.get(field).and_then(scalar_text)).collect()
}

/// `", "`-joined plucked values, or `""` when there are none.
pub fn joined(items: &[&Row], field: &str) -> String {
    pluck(items, field).join(DELIMITER)
}

/// Like [`pluck`] but reaching through `item[outer][inner]`.
pub fn pluck_nested(items: &[&Row], outer: &str, inner: &str) -> Vec<String> {
    items
        .iter()
        .filter_map(|i| i.get(outer).and_then(|o| o.get(inner)).and_then(scalar_text))
        .collect()
}

/// Keep the first occurrence of each value, preserving order.
pub fn distinct_in_order(values: Vec<String>) -> Vec<String> {
    let mut seen = ahash::AHashSet::with_capacity(values.len());
    values.into_iter().filter(|v| seen.insert(v.clone())).collect()
}

/// Numeric view of a cell for ranking. Non-numeric → `None` (sorted last).
pub fn as_f64(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
