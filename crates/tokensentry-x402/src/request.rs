use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;

use crate::constants::HEADER_TX_HASH;
use crate::executor::PaymentProof;
use crate::X402Error;

/// A request that can be sent, and re-sent with proof of payment.
///
/// Built once and never mutated; [`RequestSpec::with_proof`] returns a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub url: String,
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
    /// Overrides the client's default timeout for this request.
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: BTreeMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Set a header, replacing any existing header with the same name
    /// regardless of case.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body.
    pub fn with_json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, X402Error> {
        let body = serde_json::to_vec(value)?;
        Ok(self.with_body(body))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Copy of this request carrying `x402-tx-hash`.
    pub fn with_proof(&self, proof: &PaymentProof) -> Self {
        self.clone().with_header(HEADER_TX_HASH, proof.as_str())
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// GET and HEAD never carry a body or an injected content-type.
    pub fn carries_body(&self) -> bool {
        self.method != Method::GET && self.method != Method::HEAD
    }
}
