use std::ops::RangeInclusive;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{HEADER_CHAIN, HEADER_PRICE, HEADER_REASON, HEADER_RECIPIENT};

/// Payment terms advertised by a 402 response.
///
/// Extraction never fails: absent headers become empty strings. The
/// orchestrator rejects terms whose required fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTerms {
    /// Human-readable amount and currency, e.g. `"0.25 USDC"`.
    pub price: String,
    pub recipient: String,
    pub chain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PaymentTerms {
    /// Read the `x402-*` headers of a response.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };

        let reason = get(HEADER_REASON);
        Self {
            price: get(HEADER_PRICE),
            recipient: get(HEADER_RECIPIENT),
            chain: get(HEADER_CHAIN),
            reason: (!reason.is_empty()).then_some(reason),
        }
    }

    /// Names of the required headers that were absent or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            (HEADER_PRICE, &self.price),
            (HEADER_RECIPIENT, &self.recipient),
            (HEADER_CHAIN, &self.chain),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Result of a single x402 API call. Exactly one variant applies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiOutcome {
    Success {
        status: u16,
        body: Value,
    },
    /// Always status 402.
    PaymentRequired {
        terms: PaymentTerms,
        body: Value,
    },
    Error {
        status: u16,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        body: Value,
    },
}

impl ApiOutcome {
    /// Classify a response. 402 wins over any configured success range.
    pub fn classify(
        status: u16,
        terms: Option<PaymentTerms>,
        body: Value,
        success: &RangeInclusive<u16>,
    ) -> Self {
        if status == 402 {
            return ApiOutcome::PaymentRequired {
                terms: terms.unwrap_or_default(),
                body,
            };
        }

        if success.contains(&status) {
            return ApiOutcome::Success { status, body };
        }

        ApiOutcome::Error {
            status,
            error: body_field(&body, "error"),
            code: body_field(&body, "code"),
            body,
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            ApiOutcome::Success { status, .. } | ApiOutcome::Error { status, .. } => *status,
            ApiOutcome::PaymentRequired { .. } => 402,
        }
    }

    pub fn body(&self) -> &Value {
        match self {
            ApiOutcome::Success { body, .. }
            | ApiOutcome::PaymentRequired { body, .. }
            | ApiOutcome::Error { body, .. } => body,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiOutcome::Success { .. })
    }

    pub fn payment_terms(&self) -> Option<&PaymentTerms> {
        match self {
            ApiOutcome::PaymentRequired { terms, .. } => Some(terms),
            _ => None,
        }
    }
}

/// Parse a response body leniently: JSON if possible, `{"raw": text}`
/// otherwise, `null` when empty.
pub fn parse_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::json!({ "raw": text }))
}

fn body_field(body: &Value, key: &str) -> Option<String> {
    match body.as_object()?.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
