//! Framework models

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ControlItem, id_text, string_or_number};
use crate::template::FileInfo;

/// Status given to newly created frameworks.
pub const STATUS_READY: &str = "Ready to Map";
/// Style class for [`STATUS_READY`].
pub const STATUS_READY_CLASS: &str = "status-ready";
/// Icon for newly created frameworks.
pub const DEFAULT_ICON: &str = "bi-grid";

/// A compliance framework as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Framework {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_class: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub is_enterprise: bool,
}

/// Creation payload sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFramework {
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub status: String,
    pub status_class: String,
    pub icon: String,
    pub controls: Vec<ControlItem>,
    pub template: Option<FileInfo>,
}

/// User input for creating a framework.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameworkInput {
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub controls: Vec<ControlItem>,
    pub template: Option<FileInfo>,
}

/// Backend response to a creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedFramework {
    /// Id assigned by the backend, when the response carries one.
    pub id: Option<String>,
    /// Full response body.
    pub body: Value,
}

impl CreatedFramework {
    pub fn from_body(body: Value) -> Self {
        let id = body.get("id").and_then(id_text);
        Self { id, body }
    }
}

/// A framework together with its control items.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameworkDetails {
    pub framework: Framework,
    pub controls: Vec<ControlItem>,
}

impl FrameworkDetails {
    pub fn control_count(&self) -> usize {
        self.controls.len()
    }
}
