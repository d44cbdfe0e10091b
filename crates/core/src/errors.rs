use thiserror::Error;

/// Unified error type for the entire microcap-lab-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Trade validation ────────────────────────────────────────────
    #[error("Insufficient funds: trade costs {needed:.2} but only {available:.2} cash is available")]
    InsufficientFunds { needed: f64, available: f64 },

    #[error("No open position in {0}")]
    NoPosition(String),

    #[error("Insufficient shares: tried to sell {requested} {ticker} but only {held} held")]
    InsufficientShares {
        ticker: String,
        requested: f64,
        held: f64,
    },

    #[error("Invalid trade: {0}")]
    InvalidTrade(String),

    // ── Advisory gateway ────────────────────────────────────────────
    #[error("Malformed advisory response: {0}")]
    MalformedResponse(String),

    #[error("Lookup failed for {0}")]
    LookupFailed(String),

    #[error("API error ({provider}): {message}")]
    Api { provider: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    // ── Session persistence ─────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl CoreError {
    /// Whether this error is a local trade rejection: surfaced to the user
    /// as a non-fatal notice, guaranteed to have left no state change.
    #[must_use]
    pub fn is_trade_rejection(&self) -> bool {
        matches!(
            self,
            CoreError::InsufficientFunds { .. }
                | CoreError::NoPosition(_)
                | CoreError::InsufficientShares { .. }
                | CoreError::InvalidTrade(_)
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs to prevent
        // API key leakage. reqwest errors often contain full URLs with secrets.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
