use crate::json_utils::{as_f64, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One joined, flattened post + author row.
///
/// The underlying JSON object is kept as-is so unknown post/user fields
/// (`lang`, `conversation_id`, `source`, ...) survive the round trip.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CleanedRecord(Row);

impl CleanedRecord {
    pub fn from_row(row: Row) -> Self {
        Self(row)
    }
    pub fn into_row(self) -> Row {
        self.0
    }
    pub fn row(&self) -> &Row {
        &self.0
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }
    pub fn has_column(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    /// String cell; `None` for null, numbers, the `false` sentinel, or a missing column.
    pub fn str_col(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(|v| v.as_str())
    }
    pub fn f64_col(&self, column: &str) -> Option<f64> {
        as_f64(self.0.get(column))
    }
    pub fn bool_col(&self, column: &str) -> Option<bool> {
        self.0.get(column).and_then(|v| v.as_bool())
    }

    pub fn id(&self) -> Option<&str> {
        self.str_col("id")
    }
    pub fn username(&self) -> Option<&str> {
        self.str_col("username")
    }
    pub fn text(&self) -> Option<&str> {
        self.str_col("text")
    }
    pub fn verified(&self) -> Option<bool> {
        self.bool_col("verified")
    }

    /// Distinct context-annotation names, or `None` when the cell holds the `false` sentinel.
    pub fn context_annotations(&self) -> Option<&str> {
        match self.0.get("context_annotations") {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<Row> for CleanedRecord {
    fn from(row: Row) -> Self {
        Self(row)
    }
}
