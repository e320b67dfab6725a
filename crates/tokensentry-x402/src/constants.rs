use alloy::primitives::{address, Address};

/// Response header carrying the human-readable price, e.g. `"0.25 USDC"`.
pub const HEADER_PRICE: &str = "x402-price";

/// Response header carrying the address that must receive the payment.
pub const HEADER_RECIPIENT: &str = "x402-recipient";

/// Response header naming the chain the payment must be made on.
pub const HEADER_CHAIN: &str = "x402-chain";

/// Optional response header explaining why payment is required.
pub const HEADER_REASON: &str = "x402-reason";

/// Request header carrying the proof of payment on retry.
pub const HEADER_TX_HASH: &str = "x402-tx-hash";

/// Chain identifier used in `x402-chain` for Base mainnet.
pub const BASE_CHAIN: &str = "base";

/// Base mainnet chain ID.
pub const BASE_CHAIN_ID: u64 = 8453;

/// Currency code expected as the suffix of `x402-price`.
pub const USDC_CODE: &str = "USDC";

/// USDC has 6 decimal places.
pub const USDC_DECIMALS: u32 = 6;

/// Native USDC on Base mainnet.
pub const BASE_USDC: Address = address!("0x833589fcd6edb6e08f4c7c32d4f71b54bda02913");

/// Public Base mainnet RPC endpoint.
pub const BASE_RPC_URL: &str = "https://mainnet.base.org";

/// Default TokenSentry API origin.
pub const DEFAULT_BASE_URL: &str = "https://tokensentry.net";

/// Upper bound on how long the ERC-20 executor waits for a receipt.
pub const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 120;
