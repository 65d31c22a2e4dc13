//! End-to-end connection flows through the public API.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tokio::sync::Mutex;

use wallet_chip::config::Config;
use wallet_chip::connection::{ConnectOutcome, ConnectionManager, WalletKind};
use wallet_chip::error::{RpcError, WalletError};
use wallet_chip::ui::{chip_label, RecordingStatus, WalletChoice, CONNECT_LABEL};
use wallet_chip::wallet::{methods, MockConnector, MockEnvironment, MockWallet, WalletEvent};

const ACCOUNT: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
const OTHER: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";
const OTHER_CHECKSUMMED: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

fn config_with_project() -> Config {
    let mut config = Config::default();
    config.walletconnect.project_id = "integration-project".to_string();
    config
}

fn manager_for(wallet: &Arc<MockWallet>) -> ConnectionManager<RecordingStatus> {
    ConnectionManager::new(
        config_with_project(),
        Arc::new(MockEnvironment::with_wallet(wallet.clone())),
        Arc::new(MockConnector::new(wallet.clone())),
        RecordingStatus::new(),
    )
}

#[tokio::test]
async fn test_injected_session_lifecycle() {
    let wallet = Arc::new(
        MockWallet::new()
            .with_chain(1)
            .with_known_chains([1])
            .with_accounts([ACCOUNT])
            .with_balance("0x2386f26fc10000"),
    );
    let mut manager = manager_for(&wallet);

    let outcome = manager.connect(WalletChoice::Metamask).await;
    assert_eq!(outcome, ConnectOutcome::Connected(WalletKind::InjectedMetamask));
    assert_eq!(wallet.chain_id(), 137);
    assert_eq!(
        chip_label(&manager.snapshot(), "MATIC"),
        "0x5aAe…eAed · 0.0100 MATIC"
    );

    wallet.set_balance(OTHER, "0x0");
    wallet.emit(WalletEvent::AccountsChanged(vec![OTHER.to_string()]));
    assert_eq!(manager.drain_events().await, 1);
    assert_eq!(manager.snapshot().address.as_deref(), Some(OTHER_CHECKSUMMED));
    assert_eq!(manager.snapshot().balance.as_deref(), Some("0"));

    wallet.emit(WalletEvent::ChainChanged("0x38".into()));
    wallet.emit(WalletEvent::ChainChanged("0x1".into()));
    manager.drain_events().await;
    assert_eq!(
        manager
            .status()
            .times_shown("Please switch back to Polygon network in your wallet."),
        1
    );

    wallet.emit(WalletEvent::AccountsChanged(Vec::new()));
    manager.drain_events().await;
    assert!(!manager.is_connected());
    assert_eq!(chip_label(&manager.snapshot(), "MATIC"), CONNECT_LABEL);
    assert_eq!(manager.status().message(), None);
}

#[tokio::test]
async fn test_walletconnect_session_lifecycle() {
    let wallet = Arc::new(MockWallet::new().with_accounts([ACCOUNT]).with_session());
    let connector = Arc::new(MockConnector::new(wallet.clone()));
    let mut manager = ConnectionManager::new(
        config_with_project(),
        Arc::new(MockEnvironment::empty()),
        connector.clone(),
        RecordingStatus::new(),
    );

    let outcome = manager.connect(WalletChoice::WalletConnect).await;
    assert!(outcome.is_connected());

    let inits = connector.inits();
    assert_eq!(inits.len(), 1);
    assert_eq!(inits[0].project_id, "integration-project");
    assert_eq!(inits[0].chains, vec![137]);
    assert_eq!(
        inits[0].rpc_map.get(&137).map(String::as_str),
        Some("https://polygon-rpc.com/")
    );
    assert!(inits[0].show_qr_modal);

    wallet.emit(WalletEvent::Disconnect);
    manager.drain_events().await;
    assert!(!manager.is_connected());
    assert_eq!(wallet.teardown_calls(), 1);
}

#[tokio::test]
async fn test_switching_wallets_replaces_previous_session() {
    let first = Arc::new(MockWallet::new().with_accounts([ACCOUNT]).with_session());
    let second = Arc::new(MockWallet::new().with_accounts([OTHER]));
    let mut manager = ConnectionManager::new(
        config_with_project(),
        Arc::new(MockEnvironment::with_wallet(second.clone())),
        Arc::new(MockConnector::new(first.clone())),
        RecordingStatus::new(),
    );

    manager.connect(WalletChoice::WalletConnect).await;
    assert_eq!(first.live_subscribers(), 1);

    manager.connect(WalletChoice::Binance).await;
    assert_eq!(manager.snapshot().wallet_kind, WalletKind::InjectedBinance);
    assert_eq!(manager.snapshot().address.as_deref(), Some(OTHER_CHECKSUMMED));
    assert_eq!(first.teardown_calls(), 1);

    first.emit(WalletEvent::AccountsChanged(Vec::new()));
    manager.drain_events().await;
    assert!(manager.is_connected(), "events of the replaced session are ignored");
    assert_eq!(first.live_subscribers(), 0);
}

#[tokio::test]
async fn test_failed_connect_keeps_existing_connection() {
    let wallet = Arc::new(MockWallet::new().with_accounts([ACCOUNT]));
    let mut manager = manager_for(&wallet);
    manager.connect(WalletChoice::Metamask).await;

    wallet.fail(
        methods::REQUEST_ACCOUNTS,
        RpcError::new(4001, "User rejected the request."),
    );
    let outcome = manager.connect(WalletChoice::Binance).await;

    assert!(!outcome.is_connected());
    assert!(!matches!(
        outcome.error(),
        Some(WalletError::ChainSwitchRejected(_))
    ));
    assert_eq!(manager.snapshot().address.as_deref(), Some(CHECKSUMMED));
    assert_eq!(manager.snapshot().wallet_kind, WalletKind::InjectedMetamask);
    assert_eq!(
        manager.status().message(),
        Some("Connection failed: User rejected the request.")
    );
}

#[tokio::test]
async fn test_walletconnect_without_project_id_never_pairs() {
    let wallet = Arc::new(MockWallet::new().with_accounts([ACCOUNT]));
    let connector = Arc::new(MockConnector::new(wallet));
    let mut manager = ConnectionManager::new(
        Config::default(),
        Arc::new(MockEnvironment::empty()),
        connector.clone(),
        RecordingStatus::new(),
    );

    let outcome = manager.connect(WalletChoice::WalletConnect).await;

    assert!(matches!(
        outcome.error(),
        Some(WalletError::MisconfiguredCredential(_))
    ));
    assert!(connector.inits().is_empty());
    assert!(!manager.is_connected());
}

#[tokio::test]
async fn test_shared_manager_queues_connects() {
    let wallet = Arc::new(MockWallet::new().with_accounts([ACCOUNT]));
    let manager = Arc::new(Mutex::new(manager_for(&wallet)));

    let a = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.lock().await.connect(WalletChoice::Metamask).await })
    };
    let b = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.lock().await.connect(WalletChoice::Binance).await })
    };

    assert!(a.await.unwrap().is_connected());
    assert!(b.await.unwrap().is_connected());

    let manager = manager.lock().await;
    assert!(manager.is_connected());
    assert_eq!(manager.snapshot().address.as_deref(), Some(CHECKSUMMED));
    assert_eq!(wallet.request_count(methods::REQUEST_ACCOUNTS), 2);
}

#[tokio::test]
async fn test_next_event_waits_for_wallet() {
    let wallet = Arc::new(MockWallet::new().with_accounts([ACCOUNT]));
    let mut manager = manager_for(&wallet);
    manager.connect(WalletChoice::Metamask).await;

    let emitter = wallet.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        emitter.emit(WalletEvent::ChainChanged("0x1".into()));
    });

    let event = manager.next_event().await;
    assert_eq!(event, Some(WalletEvent::ChainChanged("0x1".into())));
    assert!(manager.chain_warning_shown());
}
