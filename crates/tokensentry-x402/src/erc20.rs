use std::time::Duration;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;

use crate::config::WalletConfig;
use crate::constants::{BASE_CHAIN_ID, DEFAULT_CONFIRM_TIMEOUT_SECS};
use crate::executor::{PaymentExecutor, PaymentProof, PaymentStatus};
use crate::{X402Error, ERC20};

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Pays with a plain ERC-20 `transfer` from a local signer.
///
/// `submit` refuses to send unless the RPC endpoint reports `chain_id`, and
/// returns as soon as the node accepts the transaction. `confirm` waits for
/// its receipt, bounded by `confirm_timeout`.
pub struct Erc20Executor<P> {
    provider: P,
    payer: Address,
    chain_id: u64,
    confirm_timeout: Duration,
}

impl<P: Provider> Erc20Executor<P> {
    /// Wrap a provider that can sign for `payer`.
    pub fn new(provider: P, payer: Address) -> Self {
        Self {
            provider,
            payer,
            chain_id: BASE_CHAIN_ID,
            confirm_timeout: Duration::from_secs(DEFAULT_CONFIRM_TIMEOUT_SECS),
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Address the payments are sent from.
    pub fn payer(&self) -> Address {
        self.payer
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// The payer's balance of `token`.
    pub async fn balance(&self, token: Address) -> Result<U256, X402Error> {
        ERC20::new(token, &self.provider)
            .balanceOf(self.payer)
            .call()
            .await
            .map_err(|e| X402Error::ChainError(format!("balanceOf {token} failed: {e}")))
    }

    async fn ensure_chain(&self) -> Result<(), X402Error> {
        let actual = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| X402Error::ChainError(format!("eth_chainId failed: {e}")))?;
        if actual != self.chain_id {
            return Err(X402Error::ChainError(format!(
                "RPC endpoint is on chain {actual}, expected {}",
                self.chain_id
            )));
        }
        Ok(())
    }
}

impl Erc20Executor<DynProvider> {
    /// Build a wallet-enabled HTTP provider from `config`.
    ///
    /// No network traffic happens until the first payment.
    pub fn connect(config: &WalletConfig) -> Result<Self, X402Error> {
        let signer: PrivateKeySigner = config
            .private_key
            .trim()
            .parse()
            .map_err(|e| X402Error::ConfigError(format!("invalid private key: {e}")))?;
        let payer = signer.address();

        let url = config
            .rpc_url
            .parse()
            .map_err(|e| X402Error::ConfigError(format!("invalid RPC url '{}': {e}", config.rpc_url)))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        Ok(Self::new(provider, payer)
            .with_chain_id(config.chain_id)
            .with_confirm_timeout(config.confirm_timeout))
    }
}

impl<P: Provider> PaymentExecutor for Erc20Executor<P> {
    async fn submit(
        &self,
        asset: &str,
        recipient: &str,
        amount: U256,
    ) -> Result<PaymentProof, X402Error> {
        let token = parse_address("token", asset)?;
        let to = parse_address("recipient", recipient)?;
        self.ensure_chain().await?;

        let contract = ERC20::new(token, &self.provider);
        // Bounded: nothing has been broadcast yet if this times out.
        let pending = tokio::time::timeout(SEND_TIMEOUT, contract.transfer(to, amount).send())
            .await
            .map_err(|_| {
                X402Error::ChainError(format!(
                    "transfer send timed out after {}s",
                    SEND_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| X402Error::ChainError(format!("transfer send failed: {e}")))?;

        let hash = *pending.tx_hash();
        tracing::debug!(%hash, from = %self.payer, %to, %amount, "transfer broadcast");
        Ok(PaymentProof::new(hash.to_string()))
    }

    async fn confirm(&self, proof: &PaymentProof) -> Result<PaymentStatus, X402Error> {
        let hash: TxHash = proof
            .as_str()
            .parse()
            .map_err(|e| X402Error::ChainError(format!("invalid transaction hash '{proof}': {e}")))?;

        let pending = PendingTransactionBuilder::new(self.provider.root().clone(), hash);
        let receipt = tokio::time::timeout(self.confirm_timeout, pending.get_receipt())
            .await
            .map_err(|_| {
                X402Error::ChainError(format!(
                    "receipt for {hash} timed out after {}s",
                    self.confirm_timeout.as_secs()
                ))
            })?
            .map_err(|e| X402Error::ChainError(format!("receipt for {hash} failed: {e}")))?;

        tracing::debug!(%hash, status = receipt.status(), "transfer receipt");
        Ok(if receipt.status() {
            PaymentStatus::Success
        } else {
            PaymentStatus::Reverted
        })
    }
}

fn parse_address(what: &str, value: &str) -> Result<Address, X402Error> {
    value
        .trim()
        .parse()
        .map_err(|e| X402Error::ChainError(format!("invalid {what} address '{value}': {e}")))
}
