use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::services::reconcile_service::ReconcilePolicy;

/// Fallback API endpoint when `SBTC_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://temp.sbtc-emily-dev.com";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "SBTC_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "SBTC_API_TIMEOUT_SECS";
pub const ENV_RECONCILE_POLICY: &str = "SBTC_RECONCILE_POLICY";

/// Settings for talking to the sBTC API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL without a trailing slash (e.g., "https://api.example.com/v1").
    pub base_url: String,

    /// Request timeout. Ignored on wasm32, where the browser owns timeouts.
    pub timeout_secs: u64,

    /// How optimistic entries are merged with a fresh server list.
    #[serde(default)]
    pub reconcile_policy: ReconcilePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            reconcile_policy: ReconcilePolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Build from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, `.env` map, test fixture).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(&url)?;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                CoreError::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number, got {raw:?}"))
            })?;
            if config.timeout_secs == 0 {
                return Err(CoreError::Config(format!(
                    "{ENV_TIMEOUT_SECS} must be greater than zero"
                )));
            }
        }

        if let Some(raw) = lookup(ENV_RECONCILE_POLICY) {
            config.reconcile_policy = raw.parse()?;
        }

        Ok(config)
    }

    /// Replace the base URL, normalising away trailing slashes.
    pub fn with_base_url(mut self, url: &str) -> Result<Self, CoreError> {
        let trimmed = url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(CoreError::Config(format!(
                "API URL must start with http:// or https://, got {url:?}"
            )));
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }
}
