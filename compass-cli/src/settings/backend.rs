//! Settings backend trait.

use async_trait::async_trait;
use serde_json::Value;

use super::SettingsError;

/// Backend trait for settings storage.
///
/// Implementations store raw JSON values.
/// The `SettingsProvider` wraps this with typed serialization.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    /// Get the raw value for a key.
    async fn get_value(&self, key: &str) -> Result<Option<Value>, SettingsError>;

    /// Set the raw value for a key.
    async fn set_value(&self, key: &str, value: Value) -> Result<(), SettingsError>;

    /// Delete a key.
    async fn delete(&self, key: &str) -> Result<(), SettingsError>;

    /// Get all keys matching a prefix.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, SettingsError>;
}
