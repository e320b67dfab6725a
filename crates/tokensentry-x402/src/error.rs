use thiserror::Error;

/// Errors returned by x402 operations.
///
/// A server answering with a non-success status is *not* an error: it is
/// [`ApiOutcome::Error`](crate::ApiOutcome::Error). Everything here means the
/// handshake itself could not complete.
#[derive(Debug, Error)]
pub enum X402Error {
    #[error("http error: {0}")]
    HttpError(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("missing x402 payment headers: {}", .missing.join(", "))]
    MissingPaymentInfo { missing: Vec<&'static str> },

    #[error("unsupported chain '{chain}' (supported: {supported})")]
    UnsupportedChain { chain: String, supported: String },

    #[error("unsupported price format: {0}")]
    InvalidPrice(String),

    #[error("payment transaction reverted: {proof}")]
    PaymentFailed { proof: String },

    #[error("chain error: {0}")]
    ChainError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl X402Error {
    /// The server sent a 402 whose payment headers cannot be acted upon.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            X402Error::MissingPaymentInfo { .. }
                | X402Error::UnsupportedChain { .. }
                | X402Error::InvalidPrice(_)
        )
    }

    /// The request never completed (DNS, connect, timeout, body read).
    pub fn is_transport(&self) -> bool {
        matches!(self, X402Error::HttpError(_) | X402Error::Timeout(_))
    }
}
