use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;
use x402::{
    ApiOutcome, ClientConfig, PaymentProof, RequestSpec, X402Client, X402Error, DEFAULT_BASE_URL,
};

/// Chains the TokenSentry API can analyse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedChain {
    Base,
    Ethereum,
    Arbitrum,
    Optimism,
    Polygon,
    Bsc,
}

impl SupportedChain {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedChain::Base => "base",
            SupportedChain::Ethereum => "ethereum",
            SupportedChain::Arbitrum => "arbitrum",
            SupportedChain::Optimism => "optimism",
            SupportedChain::Polygon => "polygon",
            SupportedChain::Bsc => "bsc",
        }
    }
}

impl fmt::Display for SupportedChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Buy,
    Sell,
}

/// `GET /v1/risk/token`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskTokenQuery {
    pub chain: SupportedChain,
    pub address: String,
    /// Server-side analysis budget; falls back to the client default.
    pub timeout_ms: Option<u64>,
    /// Proof of an earlier payment, sent as `x402-tx-hash`.
    pub tx_hash: Option<String>,
}

impl RiskTokenQuery {
    pub fn new(chain: SupportedChain, address: impl Into<String>) -> Self {
        Self {
            chain,
            address: address.into(),
            timeout_ms: None,
            tx_hash: None,
        }
    }
}

/// A numeric field the API accepts either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(u64),
    Text(String),
}

impl From<u64> for NumberOrString {
    fn from(n: u64) -> Self {
        NumberOrString::Number(n)
    }
}

impl From<&str> for NumberOrString {
    fn from(s: &str) -> Self {
        NumberOrString::Text(s.to_string())
    }
}

impl From<String> for NumberOrString {
    fn from(s: String) -> Self {
        NumberOrString::Text(s)
    }
}

/// `POST /v1/pretrade/check`. Serializes to the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PretradeCheck {
    pub chain: SupportedChain,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<TradeDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<NumberOrString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slippage_bps: Option<NumberOrString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,
    #[serde(skip)]
    pub timeout_ms: Option<u64>,
    #[serde(skip)]
    pub tx_hash: Option<String>,
}

impl PretradeCheck {
    pub fn new(chain: SupportedChain, address: impl Into<String>) -> Self {
        Self {
            chain,
            address: address.into(),
            direction: None,
            amount: None,
            slippage_bps: None,
            wallet: None,
            timeout_ms: None,
            tx_hash: None,
        }
    }

    pub fn direction(mut self, direction: TradeDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Trade size, e.g. `"1.5"` or `1500`.
    pub fn amount(mut self, amount: impl Into<NumberOrString>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn slippage_bps(mut self, slippage_bps: impl Into<NumberOrString>) -> Self {
        self.slippage_bps = Some(slippage_bps.into());
        self
    }

    /// Wallet that will execute the trade.
    pub fn wallet(mut self, wallet: impl Into<String>) -> Self {
        self.wallet = Some(wallet.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSentryConfig {
    pub base_url: String,
    pub default_timeout_ms: Option<u64>,
}

impl Default for TokenSentryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_timeout_ms: None,
        }
    }
}

/// Typed client for the TokenSentry API.
///
/// Every call returns the raw [`ApiOutcome`]; an unpaid call comes back as
/// [`ApiOutcome::PaymentRequired`]. Use the `*_request` builders with
/// [`x402::PaymentOrchestrator::execute`] to pay automatically.
#[derive(Debug, Clone)]
pub struct TokenSentryClient {
    base_url: Url,
    http: X402Client,
    default_timeout_ms: Option<u64>,
}

impl TokenSentryClient {
    pub fn new(config: TokenSentryConfig) -> Result<Self, X402Error> {
        let http = X402Client::new(ClientConfig::default())?;
        Self::with_client(config, http)
    }

    /// Create a client sharing an existing [`X402Client`].
    pub fn with_client(config: TokenSentryConfig, http: X402Client) -> Result<Self, X402Error> {
        let base = normalize_base_url(&config.base_url);
        let base_url = Url::parse(&base).map_err(|e| X402Error::InvalidUrl(format!("{base}: {e}")))?;
        Ok(Self {
            base_url,
            http,
            default_timeout_ms: config.default_timeout_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn risk_token_request(&self, query: &RiskTokenQuery) -> Result<RequestSpec, X402Error> {
        let timeout_ms = query.timeout_ms.or(self.default_timeout_ms);
        let url = self.build_url(
            "/v1/risk/token",
            &[
                ("chain", Some(query.chain.to_string())),
                ("address", Some(query.address.clone())),
                ("timeout_ms", timeout_ms.map(|t| t.to_string())),
            ],
        )?;

        Ok(attach_proof(RequestSpec::get(url), query.tx_hash.as_deref()))
    }

    /// Token risk report. Unpaid calls yield `PaymentRequired`.
    pub async fn risk_token(&self, query: &RiskTokenQuery) -> Result<ApiOutcome, X402Error> {
        let spec = self.risk_token_request(query)?;
        self.http.send(&spec).await
    }

    pub fn pretrade_check_request(&self, check: &PretradeCheck) -> Result<RequestSpec, X402Error> {
        let timeout_ms = check.timeout_ms.or(self.default_timeout_ms);
        let url = self.build_url(
            "/v1/pretrade/check",
            &[("timeout_ms", timeout_ms.map(|t| t.to_string()))],
        )?;

        let spec = RequestSpec::post(url)
            .with_header("content-type", "application/json")
            .with_json(check)?;
        Ok(attach_proof(spec, check.tx_hash.as_deref()))
    }

    /// Pre-trade safety check. Unpaid calls yield `PaymentRequired`.
    pub async fn pretrade_check(&self, check: &PretradeCheck) -> Result<ApiOutcome, X402Error> {
        let spec = self.pretrade_check_request(check)?;
        self.http.send(&spec).await
    }

    fn build_url(&self, path: &str, query: &[(&str, Option<String>)]) -> Result<String, X402Error> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| X402Error::InvalidUrl(format!("{path}: {e}")))?;

        let pairs: Vec<(&str, &str)> = query
            .iter()
            .filter_map(|(k, v)| v.as_deref().filter(|v| !v.is_empty()).map(|v| (*k, v)))
            .collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        Ok(url.to_string())
    }
}

fn attach_proof(spec: RequestSpec, tx_hash: Option<&str>) -> RequestSpec {
    match tx_hash.filter(|h| !h.is_empty()) {
        Some(hash) => spec.with_proof(&PaymentProof::new(hash)),
        None => spec,
    }
}

/// Trim, default to the public API and drop trailing slashes.
pub fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim();
    let url = if trimmed.is_empty() {
        DEFAULT_BASE_URL
    } else {
        trimmed
    };
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> TokenSentryClient {
        TokenSentryClient::new(TokenSentryConfig {
            base_url: base.to_string(),
            default_timeout_ms: None,
        })
        .unwrap()
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url(""), "https://tokensentry.net");
        assert_eq!(normalize_base_url("   "), "https://tokensentry.net");
        assert_eq!(
            normalize_base_url(" https://api.example.com/ "),
            "https://api.example.com"
        );
    }

    #[test]
    fn test_risk_token_url() {
        let mut query = RiskTokenQuery::new(
            SupportedChain::Base,
            "0x4200000000000000000000000000000000000006",
        );
        query.timeout_ms = Some(1500);
        let spec = client("https://tokensentry.net/").risk_token_request(&query).unwrap();

        assert_eq!(spec.method, reqwest::Method::GET);
        assert_eq!(
            spec.url,
            "https://tokensentry.net/v1/risk/token?chain=base&address=0x4200000000000000000000000000000000000006&timeout_ms=1500"
        );
        assert!(spec.header("x402-tx-hash").is_none());
    }

    #[test]
    fn test_empty_query_values_are_omitted() {
        let query = RiskTokenQuery::new(SupportedChain::Bsc, "");
        let spec = client("https://tokensentry.net").risk_token_request(&query).unwrap();
        assert_eq!(spec.url, "https://tokensentry.net/v1/risk/token?chain=bsc");
    }

    #[test]
    fn test_default_timeout_applies() {
        let client = TokenSentryClient::new(TokenSentryConfig {
            base_url: "https://tokensentry.net".to_string(),
            default_timeout_ms: Some(800),
        })
        .unwrap();
        let spec = client
            .pretrade_check_request(&PretradeCheck::new(SupportedChain::Base, "0xabc"))
            .unwrap();
        assert_eq!(
            spec.url,
            "https://tokensentry.net/v1/pretrade/check?timeout_ms=800"
        );
    }

    #[test]
    fn test_pretrade_body_skips_absent_fields() {
        let mut check = PretradeCheck::new(SupportedChain::Arbitrum, "0xabc").direction(TradeDirection::Sell);
        check.tx_hash = Some("0xfeed".to_string());
        check.timeout_ms = Some(10);

        let spec = client("https://tokensentry.net").pretrade_check_request(&check).unwrap();
        let body: serde_json::Value = serde_json::from_slice(spec.body.as_deref().unwrap()).unwrap();

        assert_eq!(
            body,
            serde_json::json!({"chain": "arbitrum", "address": "0xabc", "direction": "sell"})
        );
        assert_eq!(spec.header("x402-tx-hash"), Some("0xfeed"));
        assert_eq!(spec.header("Content-Type"), Some("application/json"));
        assert!(spec.url.ends_with("/v1/pretrade/check?timeout_ms=10"));
    }

    #[test]
    fn test_pretrade_builders_fill_body() {
        let check = PretradeCheck::new(SupportedChain::Base, "0xabc")
            .direction(TradeDirection::Buy)
            .amount("1.5")
            .slippage_bps(50u64)
            .wallet("0xf00d");

        let spec = client("https://tokensentry.net").pretrade_check_request(&check).unwrap();
        let body: serde_json::Value = serde_json::from_slice(spec.body.as_deref().unwrap()).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "chain": "base",
                "address": "0xabc",
                "direction": "buy",
                "amount": "1.5",
                "slippage_bps": 50,
                "wallet": "0xf00d"
            })
        );
    }

    #[test]
    fn test_numeric_fields_accept_strings() {
        let check = PretradeCheck::new(SupportedChain::Base, "0xabc")
            .amount(1500u64)
            .slippage_bps("75");
        let body = serde_json::to_value(&check).unwrap();

        assert_eq!(body["amount"], serde_json::json!(1500));
        assert_eq!(body["slippage_bps"], serde_json::json!("75"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = TokenSentryClient::new(TokenSentryConfig {
            base_url: "not a url".to_string(),
            default_timeout_ms: None,
        })
        .err()
        .expect("invalid base url must fail");
        assert!(matches!(err, X402Error::InvalidUrl(_)));
    }

    #[test]
    fn test_chain_display() {
        assert_eq!(SupportedChain::Optimism.to_string(), "optimism");
        assert_eq!(
            serde_json::to_string(&SupportedChain::Polygon).unwrap(),
            "\"polygon\""
        );
    }
}
