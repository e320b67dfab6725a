//! Call an x402-protected API, paying in USDC on Base when asked to.
//!
//! 1. call the API → 402 with `x402-*` headers
//! 2. transfer USDC on Base to `x402-recipient`
//! 3. retry with `x402-tx-hash`
//!
//! Configuration comes from the environment (and `.env`), see
//! [`PayAndCallConfig::from_env`].

use std::process::ExitCode;

use alloy::primitives::Address;
use tokensentry_client::PayAndCallConfig;
use tracing_subscriber::EnvFilter;
use x402::{
    format_minor_units, ApiOutcome, Erc20Executor, HandshakeResult, PaymentOrchestrator,
    X402Client, X402Error,
};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), X402Error> {
    let config = PayAndCallConfig::from_env()?;
    let client = X402Client::new(config.client_config())?;
    let spec = config.request();

    tracing::info!(method = %spec.method, url = %spec.url, "calling API");
    let terms = match client.send(&spec).await? {
        ApiOutcome::PaymentRequired { terms, .. } => terms,
        outcome => return print_outcome(&outcome),
    };

    let payment = config.payment_config();
    let quote = payment.quote(&terms)?;
    let decimals = payment.currency.decimals;
    tracing::info!(
        price = %quote.price,
        recipient = %quote.recipient,
        chain = %quote.chain,
        reason = terms.reason.as_deref().unwrap_or(""),
        "402 received, payment required"
    );

    if payment.dry_run {
        tracing::info!("DRY_RUN enabled; not sending on-chain transaction");
        println!("{}", serde_json::to_string_pretty(&quote)?);
        return Ok(());
    }

    let executor = Erc20Executor::connect(&config.wallet()?)?;
    tracing::info!(payer = %executor.payer(), "sending USDC transfer");

    if let Ok(token) = quote.asset.parse::<Address>() {
        match executor.balance(token).await {
            Ok(balance) if balance < quote.amount => tracing::warn!(
                balance = %format_minor_units(balance, decimals),
                needed = %format_minor_units(quote.amount, decimals),
                "payer balance is below the requested price"
            ),
            Ok(balance) => {
                tracing::debug!(balance = %format_minor_units(balance, decimals), "payer balance")
            }
            Err(e) => tracing::warn!("could not read payer balance: {e}"),
        }
    }

    let orchestrator = PaymentOrchestrator::new(client, payment, executor);
    match orchestrator.pay_and_retry(&spec, &terms).await? {
        HandshakeResult::Paid { proof, outcome } => {
            tracing::info!(tx_hash = %proof, "payment confirmed, request retried");
            print_outcome(&outcome)
        }
        HandshakeResult::DryRun { quote } => {
            println!("{}", serde_json::to_string_pretty(&quote)?);
            Ok(())
        }
        HandshakeResult::Direct { outcome } => print_outcome(&outcome),
    }
}

fn print_outcome(outcome: &ApiOutcome) -> Result<(), X402Error> {
    match outcome {
        ApiOutcome::Success { status, .. } => tracing::info!(status, "API succeeded"),
        ApiOutcome::PaymentRequired { terms, .. } => {
            tracing::warn!(price = %terms.price, "API still requires payment")
        }
        ApiOutcome::Error {
            status, error, code, ..
        } => tracing::warn!(
            status,
            error = error.as_deref().unwrap_or(""),
            code = code.as_deref().unwrap_or(""),
            "API returned an error"
        ),
    }

    println!("{}", serde_json::to_string_pretty(outcome.body())?);
    Ok(())
}
