//! Headless runner driven by script files.

use std::io::Write;

use pretty_assertions::assert_eq;

use wallet_chip::config::Config;
use wallet_chip::connection::WalletKind;
use wallet_chip::headless::{HeadlessConfig, HeadlessRunner, HeadlessWallet, OutputFormat};

const SESSION_SCRIPT: &str = "\
# connect, wander off the chain, come back, then switch accounts
connect:metamask
assert:kind:injected-metamask
assert:chip:^0x5aAe…eAed · 2\\.0000 MATIC$
wallet:chain:0x1
assert:message:switch back to Polygon
wallet:chain:0x89
assert:no-message
wallet:accounts:0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359
assert:address:0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359
wallet:accounts:
assert:disconnected
";

fn runner(config: HeadlessConfig) -> HeadlessRunner {
    let mut app = Config::default();
    app.walletconnect.project_id = "headless".to_string();
    HeadlessRunner::new(config, app)
}

#[tokio::test]
async fn test_script_file_session() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SESSION_SCRIPT.as_bytes()).unwrap();

    let config = HeadlessConfig {
        wallet: HeadlessWallet {
            balance: "0x1bc16d674ec80000".to_string(),
            ..HeadlessWallet::default()
        },
        ..HeadlessConfig::default()
    };
    let mut runner = runner(config);
    runner.load_script(file.path().to_str().unwrap()).unwrap();

    let result = runner.run().await;

    assert!(result.passed(), "failures: {:?}", result.failures);
    assert_eq!(result.assertions_passed, 6);
    assert_eq!(result.events_executed, 11);
    assert_eq!(result.state.wallet_kind, WalletKind::None);
    assert_eq!(result.chip, "Connect Wallet");
}

#[tokio::test]
async fn test_walletconnect_without_injected_wallet() {
    let config = HeadlessConfig {
        wallet: HeadlessWallet {
            injected: false,
            ..HeadlessWallet::default()
        },
        output_format: OutputFormat::Json,
        ..HeadlessConfig::default()
    };
    let mut runner = runner(config);
    runner
        .load_events("connect:binance, assert:disconnected, connect:walletconnect, assert:kind:walletconnect-v2")
        .unwrap();

    let result = runner.run().await;
    assert!(result.passed(), "failures: {:?}", result.failures);

    let json: serde_json::Value =
        serde_json::from_str(&result.render(OutputFormat::Json).unwrap()).unwrap();
    assert_eq!(json["state"]["wallet_kind"], "walletconnect-v2");
    assert_eq!(json["assertions_failed"], 0);
}

#[tokio::test]
async fn test_failed_assertions_are_reported_in_order() {
    let mut runner = runner(HeadlessConfig::default());
    runner
        .load_events("assert:connected, connect:metamask, assert:balance:1.0000, assert:connected")
        .unwrap();

    let result = runner.run().await;

    assert!(!result.passed());
    assert_eq!(result.assertions_passed, 1);
    assert_eq!(
        result.failures,
        vec!["connected".to_string(), "balance:1.0000".to_string()]
    );
    assert_eq!(result.events_executed, 4);
}

#[test]
fn test_invalid_script_is_rejected() {
    let mut runner = runner(HeadlessConfig::default());
    assert!(runner.load_events("connect:ledger").is_err());
    assert!(runner.load_events("wait:soon").is_err());
    assert!(runner.load_events("assert:chip:(").is_err());
    assert!(runner.load_script("/nonexistent/script.txt").is_err());
}

#[test]
fn test_runner_without_tokio_runtime_macro() {
    let mut runner = runner(HeadlessConfig::default());
    runner
        .load_events("connect:metamask, disconnect, assert:disconnected, assert:no-message")
        .unwrap();

    let result = tokio_test::block_on(runner.run());

    assert!(result.passed());
    assert_eq!(result.events_executed, 4);
}
