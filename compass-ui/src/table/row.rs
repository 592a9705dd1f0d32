//! Open-ended row records.

use serde::Serialize;
use serde_json::{Map, Value};

/// One record of table data.
///
/// Rows have no fixed schema; columns decide which keys are surfaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(Map<String, Value>);

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Get a raw field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Plain text projection of a field. Missing keys and nulls are empty.
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(value_text).unwrap_or_default()
    }

    /// Iterate over field values in key order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.values()
    }

    /// Whether any field's text contains `needle` (already lowercased).
    pub fn matches(&self, needle: &str) -> bool {
        self.values()
            .any(|v| value_text(v).to_lowercase().contains(needle))
    }

    /// Convert a serialisable record into a row.
    ///
    /// Records that do not serialise to a JSON object yield `None`.
    pub fn from_serialize<T: Serialize>(record: &T) -> Option<Self> {
        match serde_json::to_value(record).ok()? {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Text form of a JSON value as it appears in a cell.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Unwrap a loosely-shaped JSON payload into rows.
///
/// Accepts an array of objects, or an object carrying a `rows` array.
/// Anything else is an empty row set. Non-object array entries are skipped.
pub fn rows_from_json(value: &Value) -> Vec<Row> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("rows") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(Row(map.clone())),
            _ => None,
        })
        .collect()
}
