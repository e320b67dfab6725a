//! TokenSentry API SDK on top of the x402 protocol client.
//!
//! Unpaid calls return [`ApiOutcome::PaymentRequired`] with the terms the
//! server asked for. Either pay out of band and pass the transaction hash
//! back, or hand the request to a [`PaymentOrchestrator`](x402::PaymentOrchestrator).
//!
//! # Quick Example
//!
//! ```no_run
//! use tokensentry_client::{ApiOutcome, RiskTokenQuery, SupportedChain, TokenSentryClient, TokenSentryConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), x402::X402Error> {
//! let client = TokenSentryClient::new(TokenSentryConfig::default())?;
//! let query = RiskTokenQuery::new(SupportedChain::Base, "0x4200000000000000000000000000000000000006");
//!
//! match client.risk_token(&query).await? {
//!     ApiOutcome::Success { body, .. } => println!("report: {body}"),
//!     ApiOutcome::PaymentRequired { terms, .. } => println!("pay {} to {}", terms.price, terms.recipient),
//!     ApiOutcome::Error { status, error, .. } => eprintln!("{status}: {error:?}"),
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod sentry;

pub use config::{PayAndCallConfig, DEFAULT_API_CALL_URL};
pub use sentry::{
    normalize_base_url, NumberOrString, PretradeCheck, RiskTokenQuery, SupportedChain,
    TokenSentryClient, TokenSentryConfig, TradeDirection,
};

// Re-export commonly needed types from core
pub use x402::{ApiOutcome, PaymentTerms, X402Error};
