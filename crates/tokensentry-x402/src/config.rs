//! Read-only configuration passed to the client, orchestrator and executor at
//! construction time.

use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::constants::{
    BASE_CHAIN, BASE_CHAIN_ID, BASE_RPC_URL, BASE_USDC, DEFAULT_CONFIRM_TIMEOUT_SECS, USDC_CODE, USDC_DECIMALS,
};
use crate::outcome::PaymentTerms;
use crate::price::{parse_minor_units, PaymentQuote};
use crate::X402Error;

/// Protocol client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Applied to every request that does not carry its own timeout.
    pub default_timeout: Option<Duration>,
    /// Statuses classified as [`ApiOutcome::Success`](crate::ApiOutcome::Success).
    pub success_statuses: RangeInclusive<u16>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_timeout: None,
            success_statuses: 200..=299,
        }
    }
}

/// The single currency payments are made in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyConfig {
    /// Suffix expected in `x402-price`, matched case-insensitively.
    pub code: String,
    pub decimals: u32,
    /// Token identifier handed to the executor (an ERC-20 address for USDC).
    pub asset: String,
}

impl Default for CurrencyConfig {
    /// USDC on Base.
    fn default() -> Self {
        Self {
            code: USDC_CODE.to_string(),
            decimals: USDC_DECIMALS,
            asset: BASE_USDC.to_string(),
        }
    }
}

/// Orchestrator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfig {
    /// Chain identifier payments can be executed on, compared case-insensitively.
    pub chain: String,
    pub currency: CurrencyConfig,
    /// Stop after computing the amount; never submit a payment.
    pub dry_run: bool,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            chain: BASE_CHAIN.to_string(),
            currency: CurrencyConfig::default(),
            dry_run: false,
        }
    }
}

impl PaymentConfig {
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check that the terms can be acted upon, without parsing the price.
    ///
    /// Fails when a required header was missing or the chain is not the
    /// configured one.
    pub fn validate(&self, terms: &PaymentTerms) -> Result<(), X402Error> {
        let missing = terms.missing_fields();
        if !missing.is_empty() {
            return Err(X402Error::MissingPaymentInfo { missing });
        }

        if !terms.chain.eq_ignore_ascii_case(&self.chain) {
            return Err(X402Error::UnsupportedChain {
                chain: terms.chain.clone(),
                supported: self.chain.clone(),
            });
        }
        Ok(())
    }

    /// Validate payment terms and convert the price into minor units.
    pub fn quote(&self, terms: &PaymentTerms) -> Result<PaymentQuote, X402Error> {
        self.validate(terms)?;
        self.price(terms)
    }

    /// Price already-validated terms.
    pub(crate) fn price(&self, terms: &PaymentTerms) -> Result<PaymentQuote, X402Error> {
        let amount = parse_minor_units(&terms.price, &self.currency)
            .ok_or_else(|| X402Error::InvalidPrice(terms.price.clone()))?;

        Ok(PaymentQuote {
            price: terms.price.clone(),
            amount,
            recipient: terms.recipient.clone(),
            chain: terms.chain.clone(),
            asset: self.currency.asset.clone(),
        })
    }
}

/// Credentials and endpoint for the payment executor.
///
/// Only the executor reads these; the orchestrator never sees them.
#[derive(Clone)]
pub struct WalletConfig {
    pub rpc_url: String,
    pub private_key: String,
    /// Chain ID the RPC endpoint must report before anything is sent.
    pub chain_id: u64,
    /// Upper bound on the receipt wait.
    pub confirm_timeout: Duration,
}

impl WalletConfig {
    pub fn new(rpc_url: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            private_key: private_key.into(),
            chain_id: BASE_CHAIN_ID,
            confirm_timeout: Duration::from_secs(DEFAULT_CONFIRM_TIMEOUT_SECS),
        }
    }

    /// Wallet on the public Base RPC endpoint.
    pub fn base(private_key: impl Into<String>) -> Self {
        Self::new(BASE_RPC_URL, private_key)
    }
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &"<redacted>")
            .field("chain_id", &self.chain_id)
            .field("confirm_timeout", &self.confirm_timeout)
            .finish()
    }
}
