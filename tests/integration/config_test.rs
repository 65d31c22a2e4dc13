//! Configuration loaded from disk drives the connection flow.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use wallet_chip::config::Config;
use wallet_chip::connection::{walletconnect_options, ConnectionManager};
use wallet_chip::ui::{RecordingStatus, WalletChoice};
use wallet_chip::wallet::{methods, MockConnector, MockEnvironment, MockWallet, WalletEvent};

const AMOY: &str = r#"
[chain]
chain_id = 80002
name = "Polygon Amoy"
rpc_url = "https://rpc-amoy.polygon.technology"
block_explorer_url = "https://amoy.polygonscan.com"

[chain.native_currency]
name = "POL"
symbol = "POL"
decimals = 18

[walletconnect]
project_id = "amoy-project"
app_name = "Amoy Demo"
icons = ["https://example.com/icon.png"]
"#;

fn load(content: &str) -> Config {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    Config::load_from_file(&path).unwrap()
}

#[tokio::test]
async fn test_configured_chain_is_registered_with_wallet() {
    let config = load(AMOY);
    let wallet = Arc::new(
        MockWallet::new()
            .with_chain(137)
            .with_accounts(["0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"]),
    );
    let mut manager = ConnectionManager::new(
        config,
        Arc::new(MockEnvironment::with_wallet(wallet.clone())),
        Arc::new(MockConnector::new(wallet.clone())),
        RecordingStatus::new(),
    );

    assert!(manager.connect(WalletChoice::Metamask).await.is_connected());
    assert_eq!(wallet.chain_id(), 80002);

    let add = wallet
        .requests()
        .into_iter()
        .find(|(m, _)| m == methods::ADD_CHAIN)
        .map(|(_, params)| params)
        .unwrap();
    assert_eq!(
        add,
        json!([{
            "chainId": "0x13882",
            "chainName": "Polygon Amoy",
            "nativeCurrency": { "name": "POL", "symbol": "POL", "decimals": 18 },
            "rpcUrls": ["https://rpc-amoy.polygon.technology"],
            "blockExplorerUrls": ["https://amoy.polygonscan.com"]
        }])
    );

    wallet.emit(WalletEvent::ChainChanged("0x89".into()));
    manager.drain_events().await;
    assert_eq!(
        manager.status().message(),
        Some("Please switch back to Polygon Amoy network in your wallet.")
    );
}

#[test]
fn test_walletconnect_options_follow_config() {
    let options = walletconnect_options(&load(AMOY));

    assert_eq!(options.project_id, "amoy-project");
    assert_eq!(options.chains, vec![80002]);
    assert_eq!(options.metadata.name, "Amoy Demo");
    assert_eq!(
        options.metadata.description,
        "Connect to Polygon via WalletConnect v2"
    );

    let value = serde_json::to_value(&options).unwrap();
    assert_eq!(value["rpcMap"]["80002"], "https://rpc-amoy.polygon.technology");
    assert_eq!(value["showQrModal"], true);
}

#[test]
fn test_invalid_config_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[chain]\nrpc_url = \"polygon\"\n").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert_eq!(err.category(), "Configuration Error");
}
