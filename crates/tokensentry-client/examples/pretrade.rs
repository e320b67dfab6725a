//! Pre-trade check without paying: shows all three outcomes.
//!
//! Run:  cargo run -p tokensentry-client --example pretrade

use std::process::ExitCode;

use tokensentry_client::{
    ApiOutcome, PretradeCheck, SupportedChain, TokenSentryClient, TokenSentryConfig,
    TradeDirection,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let client = match TokenSentryClient::new(TokenSentryConfig::default()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let check = PretradeCheck::new(
        SupportedChain::Base,
        "0x4200000000000000000000000000000000000006",
    )
    .direction(TradeDirection::Sell);

    match client.pretrade_check(&check).await {
        Ok(ApiOutcome::Success { body, .. }) => println!("OK {body}"),
        Ok(ApiOutcome::PaymentRequired { terms, .. }) => println!("PAYMENT REQUIRED {terms:?}"),
        Ok(ApiOutcome::Error {
            status,
            error,
            code,
            body,
        }) => eprintln!("ERROR {status} {error:?} {code:?} {body}"),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
