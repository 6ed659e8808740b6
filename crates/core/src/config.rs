use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::CoreError;

/// Environment variable that overrides the simulation service address.
pub const SERVICE_URL_ENV: &str = "SIMULATION_SERVICE_URL";

const DEFAULT_SERVICE_URL: &str = "http://localhost:5001";

/// Injected configuration for the dashboard core.
///
/// Nothing here is persisted; the host (WASM page, desktop shell, test) builds
/// one and hands it to [`crate::Dashboard`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base address of the simulation service, without trailing slash.
    pub service_base_url: String,

    /// Per-request timeout for the HTTP client.
    pub request_timeout_secs: u64,

    /// Cadence of the progressive reveal, one point per tick.
    pub reveal_interval_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            service_base_url: DEFAULT_SERVICE_URL.to_string(),
            request_timeout_secs: 30,
            reveal_interval_ms: 10,
        }
    }
}

impl DashboardConfig {
    /// Parse a config from JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let config: DashboardConfig = serde_json::from_str(json)
            .map_err(|e| CoreError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()
    }

    /// Replace the service address with `SIMULATION_SERVICE_URL` when it is set.
    pub fn with_env_override(mut self) -> Self {
        if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
            if !url.trim().is_empty() {
                self.service_base_url = url;
            }
        }
        self
    }

    /// Check the config and normalise the base URL.
    pub fn validate(mut self) -> Result<Self, CoreError> {
        let url = self.service_base_url.trim().trim_end_matches('/').to_string();
        if url.is_empty() {
            return Err(CoreError::Config("service base URL is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::Config(format!(
                "service base URL must start with http:// or https://, got '{url}'"
            )));
        }
        if self.reveal_interval_ms == 0 {
            return Err(CoreError::Config("reveal interval must be at least 1 ms".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config("request timeout must be at least 1 s".into()));
        }
        self.service_base_url = url;
        Ok(self)
    }

    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
