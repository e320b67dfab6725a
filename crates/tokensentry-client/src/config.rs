use std::fmt;
use std::time::Duration;

use reqwest::Method;
use x402::{ClientConfig, PaymentConfig, RequestSpec, WalletConfig, X402Error};

/// Called when `API_CALL_URL` is unset: WETH on Base.
pub const DEFAULT_API_CALL_URL: &str =
    "https://tokensentry.net/v1/risk/token?chain=base&address=0x4200000000000000000000000000000000000006";

/// Settings for the `x402-pay-and-call` binary.
///
/// Loaded once at startup; nothing reads the environment afterwards.
#[derive(Clone)]
pub struct PayAndCallConfig {
    pub url: String,
    pub method: Method,
    pub body: Option<String>,
    pub dry_run: bool,
    pub timeout: Option<Duration>,
    pub rpc_url: Option<String>,
    pub private_key: Option<String>,
}

impl PayAndCallConfig {
    /// Read `API_CALL_URL`, `API_METHOD`, `API_BODY`, `API_TIMEOUT_MS`,
    /// `DRY_RUN`, `RPC_URL_BASE` and `BOT_PRIVATE_KEY`.
    pub fn from_env() -> Result<Self, X402Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an arbitrary source. Empty
    /// values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, X402Error> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let url = get("API_CALL_URL").unwrap_or_else(|| DEFAULT_API_CALL_URL.to_string());

        let method = get("API_METHOD")
            .map(|m| m.trim().to_ascii_uppercase())
            .unwrap_or_else(|| "GET".to_string());
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| X402Error::ConfigError(format!("invalid API_METHOD '{method}': {e}")))?;

        let dry_run = get("DRY_RUN")
            .map(|v| {
                let v = v.trim();
                v == "1" || v.eq_ignore_ascii_case("true")
            })
            .unwrap_or(false);

        let timeout = get("API_TIMEOUT_MS")
            .map(|v| {
                v.trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|e| X402Error::ConfigError(format!("invalid API_TIMEOUT_MS '{v}': {e}")))
            })
            .transpose()?;

        Ok(Self {
            url,
            method,
            body: get("API_BODY"),
            dry_run,
            timeout,
            rpc_url: get("RPC_URL_BASE"),
            private_key: get("BOT_PRIVATE_KEY"),
        })
    }

    /// The request to send, identical on the first call and the paid retry.
    pub fn request(&self) -> RequestSpec {
        let spec = RequestSpec::new(self.method.clone(), self.url.clone());
        match &self.body {
            Some(body) => spec.with_body(body.clone()),
            None => spec,
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            default_timeout: self.timeout,
            ..ClientConfig::default()
        }
    }

    pub fn payment_config(&self) -> PaymentConfig {
        PaymentConfig::default().dry_run(self.dry_run)
    }

    /// Payment credentials. Only needed once a payment is actually sent.
    pub fn wallet(&self) -> Result<WalletConfig, X402Error> {
        let rpc_url = self
            .rpc_url
            .clone()
            .ok_or_else(|| X402Error::ConfigError("missing env var RPC_URL_BASE".to_string()))?;
        let private_key = self
            .private_key
            .clone()
            .ok_or_else(|| X402Error::ConfigError("missing env var BOT_PRIVATE_KEY".to_string()))?;
        Ok(WalletConfig::new(rpc_url, private_key))
    }
}

impl fmt::Debug for PayAndCallConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayAndCallConfig")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("body", &self.body)
            .field("dry_run", &self.dry_run)
            .field("timeout", &self.timeout)
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
