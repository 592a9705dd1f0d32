//! Domain models exchanged with the backend

mod control;
mod framework;

pub use control::*;
pub use framework::*;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Identifier text for a JSON value that may be a string or a number.
pub(crate) fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accept ids sent as either strings or numbers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_text(&value).ok_or_else(|| serde::de::Error::custom("expected a string or number id"))
}
