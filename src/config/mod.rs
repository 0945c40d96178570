use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::services::poller::DEFAULT_POLL_INTERVAL;
use crate::services::store::{KeyValueStore, StoreError};

pub const KEY_API_URL: &str = "api_url";
pub const KEY_API_KEY: &str = "api_key";
pub const KEY_PRINTER: &str = "selected_printer";
pub const KEY_TEST_MODE: &str = "test_mode";

/// Process-level settings read from the environment.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Control API bind address (e.g., "127.0.0.1:4780").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Path of the JSON file holding persisted settings and stats.
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Seconds between poll cycles.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Seed values used only when the store has none.
    pub queue_api_url: Option<String>,
    pub queue_api_key: Option<String>,
    pub printer_name: Option<String>,
    pub test_mode: Option<bool>,

    /// SumatraPDF location on Windows; defaults to the executable's directory.
    pub sumatra_path: Option<String>,

    /// Start polling immediately after boot.
    #[serde(default)]
    pub autostart: bool,
}

fn default_bind_addr() -> String {
    "127.0.0.1:4780".to_string()
}

fn default_store_path() -> String {
    "print-agent.json".to_string()
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Agent settings from the environment, used to fill gaps in the store.
    pub fn seed(&self) -> AgentConfig {
        AgentConfig {
            api_url: self.queue_api_url.clone().unwrap_or_default(),
            api_key: self.queue_api_key.clone().unwrap_or_default(),
            printer: self.printer_name.clone().unwrap_or_default(),
            test_mode: self.test_mode.unwrap_or(false),
        }
    }
}

/// Persisted agent settings, editable from the control API.
#[derive(Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct AgentConfig {
    /// Queue base URL.
    #[garde(length(min = 1))]
    pub api_url: String,

    /// Value sent in the `X-API-Key` header.
    #[garde(length(min = 1))]
    pub api_key: String,

    /// Target printer; may stay empty in test mode.
    #[garde(custom(printer_selected(self.test_mode)))]
    #[serde(default)]
    pub printer: String,

    #[garde(skip)]
    #[serde(default)]
    pub test_mode: bool,
}

fn printer_selected(test_mode: bool) -> impl FnOnce(&str, &()) -> garde::Result {
    move |printer: &str, _: &()| {
        if test_mode || !printer.trim().is_empty() {
            Ok(())
        } else {
            Err(garde::Error::new("select a printer or enable test mode"))
        }
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("printer", &self.printer)
            .field("test_mode", &self.test_mode)
            .finish()
    }
}

impl AgentConfig {
    /// Check the settings required to start polling.
    pub fn ensure_ready(&self) -> Result<(), ConfigError> {
        self.validate()
            .map_err(|report| ConfigError::Incomplete(report.to_string()))
    }

    /// Copy of the config safe to hand to a UI.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.api_key.is_empty() {
            copy.api_key = "********".to_string();
        }
        copy
    }

    /// Load from the store, falling back to `seed` for missing keys.
    pub async fn load(store: &dyn KeyValueStore, seed: AgentConfig) -> Self {
        let text = |value: Option<serde_json::Value>| {
            value
                .and_then(|v| v.as_str().map(str::to_string))
                .filter(|s| !s.is_empty())
        };

        Self {
            api_url: text(store.get(KEY_API_URL).await).unwrap_or(seed.api_url),
            api_key: text(store.get(KEY_API_KEY).await).unwrap_or(seed.api_key),
            printer: text(store.get(KEY_PRINTER).await).unwrap_or(seed.printer),
            test_mode: store
                .get(KEY_TEST_MODE)
                .await
                .and_then(|v| v.as_bool())
                .unwrap_or(seed.test_mode),
        }
    }

    /// Write every key and flush the store.
    pub async fn persist(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        store.set(KEY_API_URL, self.api_url.clone().into()).await;
        store.set(KEY_API_KEY, self.api_key.clone().into()).await;
        store.set(KEY_PRINTER, self.printer.clone().into()).await;
        store.set(KEY_TEST_MODE, self.test_mode.into()).await;
        store.save().await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration incomplete: {0}")]
    Incomplete(String),
}
