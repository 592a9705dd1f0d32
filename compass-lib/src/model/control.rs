//! Control item models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One control of a framework.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlItem {
    #[serde(default)]
    pub control_id: String,
    #[serde(default)]
    pub control_category: String,
    #[serde(default)]
    pub control_description: String,
}

impl ControlItem {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            control_id: id.into(),
            control_category: category.into(),
            control_description: description.into(),
        }
    }

    /// Copy with every field trimmed.
    pub fn trimmed(&self) -> Self {
        Self::new(
            self.control_id.trim(),
            self.control_category.trim(),
            self.control_description.trim(),
        )
    }

    pub fn field(&self, field: ControlField) -> &str {
        match field {
            ControlField::Id => &self.control_id,
            ControlField::Category => &self.control_category,
            ControlField::Description => &self.control_description,
        }
    }

    /// Parse control items from a loosely shaped payload.
    ///
    /// Accepts an array or an object with a `rows` array. Entries that are
    /// not objects are skipped.
    pub fn list_from_json(value: &Value) -> Vec<ControlItem> {
        let items = match value {
            Value::Array(items) => items.as_slice(),
            Value::Object(map) => match map.get("rows") {
                Some(Value::Array(items)) => items.as_slice(),
                _ => &[],
            },
            _ => &[],
        };
        items
            .iter()
            .filter(|v| v.is_object())
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect()
    }
}

/// Sortable control item fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControlField {
    #[default]
    Id,
    Category,
    Description,
}

impl ControlField {
    /// Wire name of the field.
    pub fn key(self) -> &'static str {
        match self {
            ControlField::Id => "controlId",
            ControlField::Category => "controlCategory",
            ControlField::Description => "controlDescription",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "controlId" => Some(ControlField::Id),
            "controlCategory" => Some(ControlField::Category),
            "controlDescription" => Some(ControlField::Description),
            _ => None,
        }
    }
}

/// Partial update for a control item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_description: Option<String>,
}

/// Failure for one entry of a bulk add.
#[derive(Debug)]
pub struct BulkItemError {
    pub index: usize,
    pub item: ControlItem,
    pub error: crate::error::Error,
}

/// Outcome of a bulk add.
#[derive(Debug, Default)]
pub struct BulkAddResult {
    pub results: Vec<Value>,
    pub errors: Vec<BulkItemError>,
}

/// Merge an update into a control id payload.
pub(crate) fn update_payload(control_id: &str, update: &ControlItemUpdate) -> Value {
    let mut map = match serde_json::to_value(update) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    map.insert("controlId".into(), Value::String(control_id.to_string()));
    Value::Object(map)
}
