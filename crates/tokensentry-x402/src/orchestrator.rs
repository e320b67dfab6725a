//! The x402 payment handshake:
//! request → 402 → validate terms → pay → confirm → retry with proof.

use std::fmt;

use serde::Serialize;

use crate::config::PaymentConfig;
use crate::executor::{PaymentExecutor, PaymentProof, PaymentStatus};
use crate::http_client::X402Client;
use crate::outcome::{ApiOutcome, PaymentTerms};
use crate::price::{format_minor_units, PaymentQuote};
use crate::request::RequestSpec;
use crate::X402Error;

/// Stages of one payment attempt. Every path ends in `Done`, `DryRunStop`
/// or `Failed`, and no stage is entered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Pending,
    Validating,
    Parsing,
    DryRunStop,
    Submitting,
    Submitted,
    Confirming,
    Confirmed,
    Retrying,
    Done,
    Reverted,
    Failed,
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HandshakeState::Pending => "pending",
            HandshakeState::Validating => "validating",
            HandshakeState::Parsing => "parsing",
            HandshakeState::DryRunStop => "dry_run_stop",
            HandshakeState::Submitting => "submitting",
            HandshakeState::Submitted => "submitted",
            HandshakeState::Confirming => "confirming",
            HandshakeState::Confirmed => "confirmed",
            HandshakeState::Retrying => "retrying",
            HandshakeState::Done => "done",
            HandshakeState::Reverted => "reverted",
            HandshakeState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// How a handshake ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandshakeResult {
    /// The first response did not ask for payment.
    Direct { outcome: ApiOutcome },
    /// Dry run: terms were valid, nothing was paid.
    DryRun { quote: PaymentQuote },
    /// Payment confirmed and the request retried with proof. `outcome` is
    /// whatever the retry returned, including another 402.
    Paid {
        proof: PaymentProof,
        outcome: ApiOutcome,
    },
}

impl HandshakeResult {
    /// The final API outcome, if a request completed after the last decision.
    pub fn outcome(&self) -> Option<&ApiOutcome> {
        match self {
            HandshakeResult::Direct { outcome } | HandshakeResult::Paid { outcome, .. } => {
                Some(outcome)
            }
            HandshakeResult::DryRun { .. } => None,
        }
    }
}

/// Drives the payment half of the handshake through an injected executor.
///
/// Holds no mutable state; independent handshakes can run concurrently on a
/// shared orchestrator.
pub struct PaymentOrchestrator<E: PaymentExecutor> {
    client: X402Client,
    config: PaymentConfig,
    executor: E,
}

impl<E: PaymentExecutor> PaymentOrchestrator<E> {
    pub fn new(client: X402Client, config: PaymentConfig, executor: E) -> Self {
        Self {
            client,
            config,
            executor,
        }
    }

    pub fn client(&self) -> &X402Client {
        &self.client
    }

    pub fn config(&self) -> &PaymentConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Send `spec`; if the server asks for payment, pay and retry once.
    pub async fn execute(&self, spec: &RequestSpec) -> Result<HandshakeResult, X402Error> {
        match self.client.send(spec).await? {
            ApiOutcome::PaymentRequired { terms, .. } => self.pay_and_retry(spec, &terms).await,
            outcome => Ok(HandshakeResult::Direct { outcome }),
        }
    }

    /// Pay for `terms` and re-send `spec` with the proof attached.
    ///
    /// Protocol violations fail before the executor is touched. A reverted
    /// payment fails with [`X402Error::PaymentFailed`] and the request is
    /// not retried.
    pub async fn pay_and_retry(
        &self,
        spec: &RequestSpec,
        terms: &PaymentTerms,
    ) -> Result<HandshakeResult, X402Error> {
        let mut state = Transitions::new(&spec.url);

        state.enter(HandshakeState::Validating);
        self.config.validate(terms).inspect_err(|e| state.fail(e))?;

        state.enter(HandshakeState::Parsing);
        let quote = self.config.price(terms).inspect_err(|e| state.fail(e))?;

        let display_amount = format_minor_units(quote.amount, self.config.currency.decimals);
        if self.config.dry_run {
            state.enter(HandshakeState::DryRunStop);
            tracing::info!(
                amount = %quote.amount,
                display = %display_amount,
                recipient = %quote.recipient,
                chain = %quote.chain,
                "dry run: payment not sent"
            );
            return Ok(HandshakeResult::DryRun { quote });
        }

        state.enter(HandshakeState::Submitting);
        tracing::info!(
            amount = %quote.amount,
            display = %display_amount,
            recipient = %quote.recipient,
            chain = %quote.chain,
            reason = terms.reason.as_deref().unwrap_or(""),
            "submitting x402 payment"
        );
        let proof = self
            .executor
            .submit(&quote.asset, &quote.recipient, quote.amount)
            .await
            .inspect_err(|e| state.fail(e))?;

        state.enter(HandshakeState::Submitted);
        tracing::info!(proof = %proof, "payment submitted, waiting for confirmation");

        state.enter(HandshakeState::Confirming);
        let status = self
            .executor
            .confirm(&proof)
            .await
            .inspect_err(|e| state.fail(e))?;

        if status == PaymentStatus::Reverted {
            state.enter(HandshakeState::Reverted);
            let err = X402Error::PaymentFailed {
                proof: proof.to_string(),
            };
            state.fail(&err);
            return Err(err);
        }
        state.enter(HandshakeState::Confirmed);

        state.enter(HandshakeState::Retrying);
        let outcome = self
            .client
            .send(&spec.with_proof(&proof))
            .await
            .inspect_err(|e| state.fail(e))?;

        state.enter(HandshakeState::Done);
        if let ApiOutcome::PaymentRequired { .. } = outcome {
            tracing::warn!(proof = %proof, "server still requires payment after retry");
        }
        Ok(HandshakeResult::Paid { proof, outcome })
    }
}

/// Logs stage changes of one attempt.
struct Transitions<'a> {
    url: &'a str,
    current: HandshakeState,
}

impl<'a> Transitions<'a> {
    fn new(url: &'a str) -> Self {
        Self {
            url,
            current: HandshakeState::Pending,
        }
    }

    fn enter(&mut self, next: HandshakeState) {
        tracing::debug!(url = self.url, from = %self.current, to = %next, "x402 handshake");
        self.current = next;
    }

    fn fail(&mut self, err: &X402Error) {
        tracing::warn!(url = self.url, stage = %self.current, error = %err, "x402 handshake failed");
        self.current = HandshakeState::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use alloy::primitives::U256;
    use std::sync::Mutex;

    struct PanicExecutor;

    impl PaymentExecutor for PanicExecutor {
        async fn submit(&self, _: &str, _: &str, _: U256) -> Result<PaymentProof, X402Error> {
            panic!("submit must not be called");
        }

        async fn confirm(&self, _: &PaymentProof) -> Result<PaymentStatus, X402Error> {
            panic!("confirm must not be called");
        }
    }

    struct Reverting {
        submitted: Mutex<Vec<U256>>,
    }

    impl PaymentExecutor for Reverting {
        async fn submit(&self, _: &str, _: &str, amount: U256) -> Result<PaymentProof, X402Error> {
            self.submitted.lock().unwrap().push(amount);
            Ok(PaymentProof::new("0xdead"))
        }

        async fn confirm(&self, _: &PaymentProof) -> Result<PaymentStatus, X402Error> {
            Ok(PaymentStatus::Reverted)
        }
    }

    fn terms(price: &str, recipient: &str, chain: &str) -> PaymentTerms {
        PaymentTerms {
            price: price.to_string(),
            recipient: recipient.to_string(),
            chain: chain.to_string(),
            reason: None,
        }
    }

    fn orchestrator<E: PaymentExecutor>(config: PaymentConfig, executor: E) -> PaymentOrchestrator<E> {
        let client = X402Client::new(ClientConfig::default()).unwrap();
        PaymentOrchestrator::new(client, config, executor)
    }

    // Unroutable: any attempt to actually send would fail, not hang on a real host.
    fn spec() -> RequestSpec {
        RequestSpec::get("http://127.0.0.1:9/never")
    }

    #[tokio::test]
    async fn test_dry_run_stops_before_executor() {
        let orch = orchestrator(PaymentConfig::default().dry_run(true), PanicExecutor);
        let result = orch
            .pay_and_retry(&spec(), &terms("0.25 USDC", "0xabc", "BASE"))
            .await
            .unwrap();

        match result {
            HandshakeResult::DryRun { quote } => {
                assert_eq!(quote.amount, U256::from(250_000u64));
                assert_eq!(quote.recipient, "0xabc");
            }
            other => panic!("expected dry run, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_terms_never_reach_executor() {
        let orch = orchestrator(PaymentConfig::default(), PanicExecutor);
        for t in [
            terms("", "0xabc", "base"),
            terms("1 USDC", "", "base"),
            terms("1 USDC", "0xabc", ""),
        ] {
            let err = orch.pay_and_retry(&spec(), &t).await.unwrap_err();
            assert!(matches!(err, X402Error::MissingPaymentInfo { .. }), "{err}");
        }
    }

    #[tokio::test]
    async fn test_unsupported_chain_and_bad_price_are_fatal() {
        let orch = orchestrator(PaymentConfig::default(), PanicExecutor);

        let err = orch
            .pay_and_retry(&spec(), &terms("1 USDC", "0xabc", "polygon"))
            .await
            .unwrap_err();
        assert!(matches!(err, X402Error::UnsupportedChain { .. }));

        let err = orch
            .pay_and_retry(&spec(), &terms("abc USDC", "0xabc", "base"))
            .await
            .unwrap_err();
        assert!(matches!(err, X402Error::InvalidPrice(_)));
    }

    #[tokio::test]
    async fn test_reverted_payment_fails_without_retry() {
        let executor = Reverting {
            submitted: Mutex::new(Vec::new()),
        };
        let orch = orchestrator(PaymentConfig::default(), executor);

        // The request points at a closed port, so a retry would surface as a
        // transport error rather than PaymentFailed.
        let err = orch
            .pay_and_retry(&spec(), &terms("1.2345678 USDC", "0xabc", "base"))
            .await
            .unwrap_err();

        assert!(matches!(err, X402Error::PaymentFailed { ref proof } if proof == "0xdead"));
        assert_eq!(
            *orch.executor().submitted.lock().unwrap(),
            vec![U256::from(1_234_567u64)]
        );
    }

    #[test]
    fn test_state_display() {
        assert_eq!(HandshakeState::DryRunStop.to_string(), "dry_run_stop");
        assert_eq!(HandshakeState::Confirming.to_string(), "confirming");
    }

    #[test]
    fn test_result_outcome_accessor() {
        let outcome = ApiOutcome::Success {
            status: 200,
            body: serde_json::Value::Null,
        };
        let paid = HandshakeResult::Paid {
            proof: PaymentProof::new("0x1"),
            outcome: outcome.clone(),
        };
        assert_eq!(paid.outcome(), Some(&outcome));

        let dry = HandshakeResult::DryRun {
            quote: PaymentConfig::default()
                .quote(&terms("1 USDC", "0xabc", "base"))
                .unwrap(),
        };
        assert!(dry.outcome().is_none());
    }
}
