use thiserror::Error;

/// Fallback shown when the simulation service fails without an `error` field.
pub const SIMULATION_FAILED: &str = "Simulation failed";

/// Fallback shown when the tickers endpoint fails.
pub const TICKERS_FAILED: &str = "Failed to fetch tickers";

/// Unified error type for the entire dashboard core.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. `message` is the service-provided text, verbatim.
    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Request validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A newer run took ownership of the display before this one finished.
    #[error("Run {0} was superseded by a newer run")]
    Superseded(u64),
}

impl CoreError {
    /// Human-readable text for the `Failure` state.
    ///
    /// Service errors are surfaced verbatim; everything else uses its display text.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Service { message, .. } if !message.trim().is_empty() => message.clone(),
            CoreError::Service { .. } => SIMULATION_FAILED.to_string(),
            CoreError::ValidationError(msg) => msg.clone(),
            other => other.to_string(),
        }
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
        // Strip query parameters: the base address is injected and may carry tokens.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        if e.is_decode() {
            CoreError::Deserialization(sanitized)
        } else {
            CoreError::Network(sanitized)
        }
    }
}
