// Settings loaded with the 'config' crate: defaults, then an optional
// config.toml, then APP_* environment variables (APP_STORE__API_KEY etc).

use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_address: String,
    pub store: StoreSettings,
    pub search: SearchSettings,
}

/// Connection details for the hosted document backend.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub endpoint: String,
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    pub database_id: Option<String>,
    pub collection_id: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub initial_retry_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SearchSettings {
    pub default_limit: usize,
    /// Hard ceiling on `limit`, bounds how much one search holds in memory.
    pub max_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { default_limit: 12, max_limit: 100 }
    }
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            .set_default("server_address", "127.0.0.1:3000")?
            .set_default("store.endpoint", "https://cloud.appwrite.io/v1")?
            .set_default("store.collection_id", "cars")?
            .set_default("store.request_timeout_secs", 10)?
            .set_default("store.max_retries", 3)?
            .set_default("store.initial_retry_delay_ms", 250)?
            .set_default("search.default_limit", 12)?
            .set_default("search.max_limit", 100)?
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let search = &self.search;
        if search.default_limit == 0 || search.max_limit == 0 {
            bail!("search.default_limit and search.max_limit must be at least 1");
        }
        if search.default_limit > search.max_limit {
            bail!(
                "search.default_limit ({}) must not exceed search.max_limit ({})",
                search.default_limit,
                search.max_limit
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(default_limit: usize, max_limit: usize) -> Settings {
        Settings {
            server_address: "127.0.0.1:0".into(),
            store: StoreSettings {
                endpoint: "http://localhost".into(),
                project_id: None,
                api_key: None,
                database_id: None,
                collection_id: "cars".into(),
                request_timeout_secs: 1,
                max_retries: 0,
                initial_retry_delay_ms: 1,
            },
            search: SearchSettings { default_limit, max_limit },
        }
    }

    #[test]
    fn accepts_default_within_ceiling() {
        assert!(settings(12, 100).validate().is_ok());
        assert!(settings(100, 100).validate().is_ok());
    }

    #[test]
    fn rejects_default_above_ceiling() {
        assert!(settings(120, 100).validate().is_err());
    }

    #[test]
    fn rejects_zero_limits() {
        assert!(settings(0, 100).validate().is_err());
        assert!(settings(12, 0).validate().is_err());
    }
}
