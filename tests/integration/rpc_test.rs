//! JSON-RPC provider tests.
//!
//! Live reads need an endpoint in WALLET_CHIP_RPC_URL; they skip otherwise.

use serde_json::json;

use wallet_chip::config::ChainConfig;
use wallet_chip::connection::{ensure_target_chain, fetch_balance};
use wallet_chip::error::WalletError;
use wallet_chip::format::chain_id_from_value;
use wallet_chip::wallet::{methods, HttpRpcConfig, HttpRpcProvider, WalletProvider};

/// Helper to get the test endpoint from environment.
fn get_test_rpc_url() -> Option<String> {
    std::env::var("WALLET_CHIP_RPC_URL").ok()
}

fn get_test_provider() -> Option<HttpRpcProvider> {
    let url = get_test_rpc_url()?;
    HttpRpcProvider::new(HttpRpcConfig::new(url).with_timeout(10)).ok()
}

#[tokio::test]
async fn test_live_chain_id() {
    let Some(provider) = get_test_provider() else {
        eprintln!("Skipping test: WALLET_CHIP_RPC_URL not set");
        return;
    };

    let value = provider.request(methods::CHAIN_ID, json!([])).await.unwrap();
    assert!(chain_id_from_value(&value).is_some());
}

#[tokio::test]
async fn test_live_balance_of_zero_address() {
    let Some(provider) = get_test_provider() else {
        eprintln!("Skipping test: WALLET_CHIP_RPC_URL not set");
        return;
    };

    let balance = fetch_balance(
        &provider,
        "0x0000000000000000000000000000000000000000",
        18,
    )
    .await
    .unwrap();
    assert!(!balance.is_empty());
}

#[tokio::test]
async fn test_unreachable_endpoint_reports_connection_failure() {
    let provider =
        HttpRpcProvider::new(HttpRpcConfig::new("http://127.0.0.1:9/").with_timeout(2)).unwrap();

    let err = provider
        .request(methods::CHAIN_ID, json!([]))
        .await
        .unwrap_err();
    assert_eq!(err.code, None);
    assert!(!err.message.is_empty());
}

#[tokio::test]
async fn test_unreachable_endpoint_fails_chain_check() {
    let provider =
        HttpRpcProvider::new(HttpRpcConfig::new("http://127.0.0.1:9/").with_timeout(2)).unwrap();

    let err = ensure_target_chain(&provider, &ChainConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::Unknown(_)));
}
