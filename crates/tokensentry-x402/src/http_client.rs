use reqwest::header::CONTENT_TYPE;

use crate::config::ClientConfig;
use crate::outcome::{parse_body, ApiOutcome, PaymentTerms};
use crate::request::RequestSpec;
use crate::X402Error;

/// HTTP client that classifies x402 responses.
///
/// Wraps `reqwest::Client`. Each [`send`](X402Client::send) performs exactly
/// one round trip and never pays or retries; see
/// [`PaymentOrchestrator`](crate::PaymentOrchestrator) for that.
#[derive(Debug, Clone)]
pub struct X402Client {
    http: reqwest::Client,
    config: ClientConfig,
}

impl X402Client {
    pub fn new(config: ClientConfig) -> Result<Self, X402Error> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| X402Error::ConfigError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Create a client with a custom reqwest::Client.
    pub fn with_http_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send `spec` once and classify the response.
    ///
    /// Transport failures are returned as `Err`; any answer from the server,
    /// whatever its status, is an `Ok(ApiOutcome)`.
    pub async fn send(&self, spec: &RequestSpec) -> Result<ApiOutcome, X402Error> {
        let url = reqwest::Url::parse(&spec.url)
            .map_err(|e| X402Error::InvalidUrl(format!("{}: {e}", spec.url)))?;
        let mut req = self.http.request(spec.method.clone(), url);
        for (name, value) in &spec.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if spec.carries_body() {
            if spec.header(CONTENT_TYPE.as_str()).is_none() {
                req = req.header(CONTENT_TYPE, "application/json");
            }
            req = req.body(spec.body.clone().unwrap_or_default());
        }

        if let Some(timeout) = spec.timeout.or(self.config.default_timeout) {
            req = req.timeout(timeout);
        }

        tracing::debug!(method = %spec.method, url = %spec.url, "x402 request");

        let resp = req.send().await.map_err(|e| transport_error("request failed", e))?;

        let status = resp.status().as_u16();
        let terms = (status == 402).then(|| PaymentTerms::from_headers(resp.headers()));

        let text = resp
            .text()
            .await
            .map_err(|e| transport_error("failed to read response body", e))?;

        let outcome = ApiOutcome::classify(
            status,
            terms,
            parse_body(&text),
            &self.config.success_statuses,
        );

        tracing::debug!(status, url = %spec.url, "x402 response");
        Ok(outcome)
    }
}

fn transport_error(context: &str, e: reqwest::Error) -> X402Error {
    // Nothing reached the network; resending cannot help.
    if e.is_builder() {
        X402Error::ConfigError(format!("{context}: invalid request: {e}"))
    } else if e.is_timeout() {
        X402Error::Timeout(format!("{context}: {e}"))
    } else {
        X402Error::HttpError(format!("{context}: {e}"))
    }
}
