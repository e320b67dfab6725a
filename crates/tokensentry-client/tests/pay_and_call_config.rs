//! Environment handling of the `x402-pay-and-call` binary.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Method;
use tokensentry_client::{PayAndCallConfig, X402Error, DEFAULT_API_CALL_URL};

fn load(vars: &[(&str, &str)]) -> Result<PayAndCallConfig, X402Error> {
    let env: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    PayAndCallConfig::from_lookup(|key| env.get(key).cloned())
}

#[test]
fn empty_environment_uses_defaults() {
    let config = load(&[]).unwrap();

    assert_eq!(config.url, DEFAULT_API_CALL_URL);
    assert_eq!(config.method, Method::GET);
    assert_eq!(config.body, None);
    assert!(!config.dry_run);
    assert_eq!(config.timeout, None);

    let spec = config.request();
    assert_eq!(spec.method, Method::GET);
    assert_eq!(spec.body, None);
}

#[test]
fn method_is_upper_cased_and_body_kept() {
    let config = load(&[
        ("API_CALL_URL", "https://tokensentry.net/v1/pretrade/check"),
        ("API_METHOD", " post "),
        ("API_BODY", r#"{"chain":"base"}"#),
    ])
    .unwrap();

    assert_eq!(config.method, Method::POST);
    let spec = config.request();
    assert_eq!(spec.url, "https://tokensentry.net/v1/pretrade/check");
    assert_eq!(spec.body.as_deref(), Some(br#"{"chain":"base"}"#.as_slice()));
}

#[test]
fn dry_run_accepts_one_and_true() {
    for value in ["1", "true", "TRUE", " True "] {
        let config = load(&[("DRY_RUN", value)]).unwrap();
        assert!(config.dry_run, "{value:?} should enable dry run");
        assert!(config.payment_config().dry_run);
    }
    for value in ["0", "false", "yes", ""] {
        let config = load(&[("DRY_RUN", value)]).unwrap();
        assert!(!config.dry_run, "{value:?} should not enable dry run");
    }
}

#[test]
fn timeout_is_parsed_in_milliseconds() {
    let config = load(&[("API_TIMEOUT_MS", "1500")]).unwrap();
    assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
    assert_eq!(
        config.client_config().default_timeout,
        Some(Duration::from_millis(1500))
    );

    let err = load(&[("API_TIMEOUT_MS", "soon")]).unwrap_err();
    assert!(matches!(err, X402Error::ConfigError(msg) if msg.contains("API_TIMEOUT_MS")));
}

#[test]
fn wallet_requires_both_credentials() {
    let err = load(&[("BOT_PRIVATE_KEY", "0x01")]).unwrap().wallet().unwrap_err();
    assert!(matches!(err, X402Error::ConfigError(msg) if msg.contains("RPC_URL_BASE")));

    let err = load(&[("RPC_URL_BASE", "http://localhost:8545")])
        .unwrap()
        .wallet()
        .unwrap_err();
    assert!(matches!(err, X402Error::ConfigError(msg) if msg.contains("BOT_PRIVATE_KEY")));

    let wallet = load(&[
        ("RPC_URL_BASE", "http://localhost:8545"),
        ("BOT_PRIVATE_KEY", "0x01"),
    ])
    .unwrap()
    .wallet()
    .unwrap();
    assert_eq!(wallet.rpc_url, "http://localhost:8545");
}

#[test]
fn debug_output_redacts_private_key() {
    let config = load(&[("BOT_PRIVATE_KEY", "0xsecretkeymaterial")]).unwrap();
    let printed = format!("{config:?}");

    assert!(printed.contains("<redacted>"));
    assert!(!printed.contains("secretkeymaterial"));
}
