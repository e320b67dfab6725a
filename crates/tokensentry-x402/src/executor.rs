//! The payment-execution capability consumed by the orchestrator.
//!
//! - [`PaymentExecutor::submit`] sends a transfer and returns as soon as the
//!   network has accepted it
//! - [`PaymentExecutor::confirm`] waits for the transfer to be final
//!
//! See [`crate::erc20::Erc20Executor`] for the on-chain implementation.

use std::fmt;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::X402Error;

/// Opaque proof of payment, sent back to the server as `x402-tx-hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentProof(String);

impl PaymentProof {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Final verdict on a submitted payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Reverted,
}

/// Executes payments on behalf of the orchestrator.
///
/// Implementations own their credentials and connection; the orchestrator
/// only hands over what to pay and to whom.
pub trait PaymentExecutor: Send + Sync {
    /// Submit a transfer of `amount` minor units of `asset` to `recipient`.
    /// Returns a provisional proof once the submission is accepted.
    fn submit(
        &self,
        asset: &str,
        recipient: &str,
        amount: U256,
    ) -> impl std::future::Future<Output = Result<PaymentProof, X402Error>> + Send;

    /// Wait until the submitted payment is final.
    fn confirm(
        &self,
        proof: &PaymentProof,
    ) -> impl std::future::Future<Output = Result<PaymentStatus, X402Error>> + Send;
}
