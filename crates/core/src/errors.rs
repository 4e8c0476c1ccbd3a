use thiserror::Error;

/// Unified error type for the entire sbtc-portfolio-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    /// Transport failure or any non-2xx response. The status code is
    /// carried in the message only; callers never branch on it.
    #[error("Network error: {0}")]
    Network(String),

    // ── Caller input ────────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid wallet address: {0}")]
    AddressInvalid(String),

    // ── Local payloads / configuration ──────────────────────────────
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// True for failures that came from talking to the remote API.
    pub fn is_network(&self) -> bool {
        matches!(self, CoreError::Network(_))
    }

    /// True for failures detected locally, before any request was sent.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CoreError::ValidationError(_) | CoreError::AddressInvalid(_)
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors embed the full URL; strip any query string so
        // credentials passed as parameters never reach logs or the UI.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
