//! Effective configuration: stored settings overridden by arguments.

use compass_lib::{ApiClient, ApiMode, DEFAULT_JSON_BASE, DEFAULT_SERVICE_BASE};
use compass_lib::error::ApiError;
use compass_ui::table::DEFAULT_PAGE_SIZE;

use crate::cli::Args;
use crate::settings::{
    API_JSON_BASE, API_MODE, API_SERVICE_BASE, SettingsError, SettingsProvider, TABLE_PAGE_SIZE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub service_base: String,
    pub json_base: String,
    pub mode: ApiMode,
    pub page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_base: DEFAULT_SERVICE_BASE.to_string(),
            json_base: DEFAULT_JSON_BASE.to_string(),
            mode: ApiMode::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// Read stored settings, falling back to defaults for missing keys.
    ///
    /// An unparsable stored mode is logged and ignored.
    pub async fn load(settings: &SettingsProvider) -> Result<Self, SettingsError> {
        let defaults = Self::default();
        let mode = match settings.get::<String>(API_MODE).await? {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                log::warn!("Ignoring stored {}: {}", API_MODE, e);
                defaults.mode
            }),
            None => defaults.mode,
        };

        Ok(Self {
            service_base: settings
                .get_or(API_SERVICE_BASE, defaults.service_base)
                .await?,
            json_base: settings.get_or(API_JSON_BASE, defaults.json_base).await?,
            mode,
            page_size: settings.get_or(TABLE_PAGE_SIZE, defaults.page_size).await?,
        })
    }

    /// Apply command-line overrides.
    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(base) = &args.service_base {
            self.service_base = base.clone();
        }
        if let Some(base) = &args.json_base {
            self.json_base = base.clone();
        }
        if let Some(mode) = args.mode {
            self.mode = mode;
        }
        if let Some(size) = args.page_size {
            self.page_size = size;
        }
        self
    }

    /// Build the API client described by this configuration.
    pub fn api_client(&self) -> Result<ApiClient, ApiError> {
        ApiClient::builder()
            .mode(self.mode)
            .service_base(&self.service_base)
            .json_base(&self.json_base)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[tokio::test]
    async fn test_defaults_when_nothing_stored() {
        let config = AppConfig::load(&SettingsProvider::in_memory()).await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.mode, ApiMode::Auto);
        assert_eq!(config.page_size, 10);
    }

    #[tokio::test]
    async fn test_stored_values_then_args() {
        let settings = SettingsProvider::in_memory();
        settings.set(API_MODE, &"service").await.unwrap();
        settings.set(TABLE_PAGE_SIZE, &5usize).await.unwrap();
        settings.set(API_JSON_BASE, &"/srv/api").await.unwrap();

        let stored = AppConfig::load(&settings).await.unwrap();
        assert_eq!(stored.mode, ApiMode::Service);
        assert_eq!(stored.page_size, 5);
        assert_eq!(stored.json_base, "/srv/api");

        let args = Args::try_parse_from(["compass", "--mode", "json", "--page-size", "20"]).unwrap();
        let config = stored.with_args(&args);
        assert_eq!(config.mode, ApiMode::Json);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.json_base, "/srv/api");
    }

    #[tokio::test]
    async fn test_bad_stored_mode_falls_back() {
        let settings = SettingsProvider::in_memory();
        settings.set(API_MODE, &"offline").await.unwrap();
        let config = AppConfig::load(&settings).await.unwrap();
        assert_eq!(config.mode, ApiMode::Auto);
    }
}
