//! JSON file settings backend.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{SettingsBackend, SettingsError};

/// Settings stored as one JSON object in a file.
///
/// The file is read once on open and rewritten after every change.
pub struct JsonFileBackend {
    path: PathBuf,
    values: Mutex<BTreeMap<String, Value>>,
}

impl JsonFileBackend {
    /// Open the settings file at `path`, creating parent directories.
    ///
    /// A missing file starts out empty.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let values = match tokio::fs::read_to_string(&path).await {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(SettingsError::Deserialization)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, values: &BTreeMap<String, Value>) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(values).map_err(SettingsError::Serialization)?;
        tokio::fs::write(&self.path, text).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsBackend for JsonFileBackend {
    async fn get_value(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut values = self.values.lock().await;
        values.insert(key.to_string(), value);
        self.persist(&values).await
    }

    async fn delete(&self, key: &str) -> Result<(), SettingsError> {
        let mut values = self.values.lock().await;
        if values.remove(key).is_some() {
            self.persist(&values).await?;
        }
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, SettingsError> {
        Ok(self
            .values
            .lock()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
