//! x402 pay-per-request protocol client.
//!
//! A server that wants payment answers with HTTP 402 and `x402-*` headers
//! naming a price, a recipient and a chain. The client pays on-chain and
//! repeats the request with the transaction hash in `x402-tx-hash`.
//!
//! # Two halves
//!
//! - **Protocol client** ([`X402Client`]): one round trip, classified into
//!   [`ApiOutcome::Success`], [`ApiOutcome::PaymentRequired`] or
//!   [`ApiOutcome::Error`]
//! - **Orchestrator** ([`PaymentOrchestrator`]): validates the terms, pays
//!   through a [`PaymentExecutor`], waits for confirmation and retries once
//!
//! # Quick example
//!
//! ```no_run
//! use x402::{
//!     ClientConfig, Erc20Executor, HandshakeResult, PaymentConfig, PaymentOrchestrator,
//!     RequestSpec, WalletConfig, X402Client,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), x402::X402Error> {
//! let client = X402Client::new(ClientConfig::default())?;
//! let executor = Erc20Executor::connect(&WalletConfig::base("0xYOUR_KEY"))?;
//! let orchestrator = PaymentOrchestrator::new(client, PaymentConfig::default(), executor);
//!
//! let spec = RequestSpec::get("https://tokensentry.net/v1/risk/token?chain=base&address=0x4200000000000000000000000000000000000006");
//! if let HandshakeResult::Paid { proof, outcome } = orchestrator.execute(&spec).await? {
//!     println!("paid in {proof}, got {}", outcome.status());
//! }
//! # Ok(())
//! # }
//! ```

// Core types and traits
pub mod config;
pub mod constants;
pub mod error;
pub mod executor;
pub mod outcome;
pub mod price;
pub mod request;

// HTTP client and handshake
pub mod http_client;
pub mod orchestrator;

// On-chain payment execution
pub mod erc20;

use alloy::sol;

// Minimal ERC-20 interface used to pay and to report the payer's balance.
sol! {
    #[sol(rpc)]
    interface ERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function transfer(address to, uint256 value) external returns (bool);
    }
}

// Re-exports
pub use config::{ClientConfig, CurrencyConfig, PaymentConfig, WalletConfig};
pub use constants::*;
pub use error::X402Error;
pub use executor::{PaymentExecutor, PaymentProof, PaymentStatus};
pub use outcome::{parse_body, ApiOutcome, PaymentTerms};
pub use price::{format_minor_units, parse_minor_units, PaymentQuote};
pub use request::RequestSpec;

pub use erc20::Erc20Executor;
pub use http_client::X402Client;
pub use orchestrator::{HandshakeResult, HandshakeState, PaymentOrchestrator};

pub use alloy::primitives::U256;
