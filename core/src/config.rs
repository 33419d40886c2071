//! Client configuration.
//!
//! Defaults are overlaid with `MATCHDAY_*` environment variables
//! (`MATCHDAY_BASE_URL`, `MATCHDAY_TIMEOUT_MS`, `MATCHDAY_PAGE_SIZE`,
//! `MATCHDAY_DEBOUNCE_MS`, `MATCHDAY_LOADING_TEXT`).

use std::collections::HashMap;
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "MATCHDAY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Backend origin; API paths and relative asset paths hang off it.
    pub base_url: String,
    pub timeout_ms: u64,
    /// Page size used by the list screens.
    pub page_size: u32,
    /// Quiet period of the search input.
    pub debounce_ms: u64,
    pub loading_text: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: 10_000,
            page_size: 20,
            debounce_ms: 500,
            loading_text: "Loading...".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load with an explicit variable map standing in for the process env.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::load(Some(vars))
    }

    fn load(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("timeout_ms", defaults.timeout_ms as i64)?
            .set_default("page_size", defaults.page_size as i64)?
            .set_default("debounce_ms", defaults.debounce_ms as i64)?
            .set_default("loading_text", defaults.loading_text)?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
