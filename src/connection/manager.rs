//! Connection manager for wallet lifecycle and event reconciliation.

use std::collections::HashMap;
use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use super::chain::ensure_target_chain;
use super::state::{ActiveConnection, ConnectionSnapshot, ConnectionState, InjectedKind, WalletKind};
use crate::config::{ChainConfig, Config};
use crate::error::{Result, WalletError};
use crate::format::{checksum_address, format_balance_value, parse_chain_id};
use crate::ui::{StatusSink, WalletChoice};
use crate::wallet::{
    methods, AppMetadata, WalletConnectConnector, WalletConnectOptions, WalletEnvironment,
    WalletEvent, WalletProvider,
};

/// Status shown while the WalletConnect pairing UI is up.
pub const WALLETCONNECT_OPENING: &str = "Opening WalletConnect v2 QR / deep link...";

/// Result of a connect attempt.
///
/// Failures have already been reported on the status line; the outcome only
/// tells the caller what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(WalletKind),
    Failed(WalletError),
}

impl ConnectOutcome {
    /// Returns true if the attempt produced a connection.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    /// Returns the failure, if any.
    pub fn error(&self) -> Option<&WalletError> {
        match self {
            Self::Connected(_) => None,
            Self::Failed(err) => Some(err),
        }
    }
}

/// A connection that passed every check but is not yet visible.
struct PendingConnection {
    address: String,
    balance: String,
    provider: Arc<dyn WalletProvider>,
}

/// Owns the connection state and keeps it consistent with the wallet.
///
/// Every mutating operation takes `&mut self`, so a connect cannot start while
/// another is in flight. Share the manager behind `tokio::sync::Mutex` to queue
/// connect requests coming from several tasks.
pub struct ConnectionManager<S: StatusSink> {
    config: Config,
    environment: Arc<dyn WalletEnvironment>,
    connector: Arc<dyn WalletConnectConnector>,
    status: S,
    state: ConnectionState,
    chain_warning: bool,
}

impl<S: StatusSink> ConnectionManager<S> {
    /// Creates a disconnected manager.
    pub fn new(
        config: Config,
        environment: Arc<dyn WalletEnvironment>,
        connector: Arc<dyn WalletConnectConnector>,
        status: S,
    ) -> Self {
        Self {
            config,
            environment,
            connector,
            status,
            state: ConnectionState::Disconnected,
            chain_warning: false,
        }
    }

    /// Get the connection state.
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Returns a copy of the observable state.
    pub fn snapshot(&self) -> ConnectionSnapshot {
        self.state.snapshot()
    }

    /// Get the configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the status sink.
    pub fn status(&self) -> &S {
        &self.status
    }

    /// Get the status sink mutably.
    pub fn status_mut(&mut self) -> &mut S {
        &mut self.status
    }

    /// Check if there's an active connection.
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Returns true while the wrong-network warning is displayed.
    pub fn chain_warning_shown(&self) -> bool {
        self.chain_warning
    }

    /// Connects with the wallet the user picked.
    pub async fn connect(&mut self, choice: WalletChoice) -> ConnectOutcome {
        match choice {
            WalletChoice::Metamask => self.connect_injected(InjectedKind::Metamask).await,
            WalletChoice::Binance => self.connect_injected(InjectedKind::Binance).await,
            WalletChoice::WalletConnect => self.connect_wallet_connect().await,
        }
    }

    /// Connects the wallet injected into the environment.
    pub async fn connect_injected(&mut self, kind: InjectedKind) -> ConnectOutcome {
        self.show_status(kind.connecting_message());

        let Some(provider) = self.environment.injected() else {
            let err = WalletError::NoWalletDetected;
            warn!("{}", err);
            self.show_status(&err.to_string());
            return ConnectOutcome::Failed(err);
        };

        match establish_injected(provider, &self.config.chain).await {
            Ok(pending) => {
                let wallet_kind = kind.wallet_kind();
                self.commit(pending, wallet_kind).await;
                ConnectOutcome::Connected(wallet_kind)
            }
            Err(err) => {
                error!("Injected connect error: {}", err);
                self.report_failure("Connection failed", &err);
                ConnectOutcome::Failed(err)
            }
        }
    }

    /// Connects through a WalletConnect v2 session.
    pub async fn connect_wallet_connect(&mut self) -> ConnectOutcome {
        if !self.config.walletconnect.has_project_id() {
            let err = WalletError::misconfigured(
                "Set walletconnect.project_id (or WALLETCONNECT_PROJECT_ID) before connecting via WalletConnect v2.",
            );
            warn!("{}", err);
            self.show_status(&err.to_string());
            return ConnectOutcome::Failed(err);
        }

        self.show_status(WALLETCONNECT_OPENING);
        let options = walletconnect_options(&self.config);

        match establish_wallet_connect(self.connector.as_ref(), &options, &self.config.chain).await {
            Ok(pending) => {
                self.commit(pending, WalletKind::WalletconnectV2).await;
                ConnectOutcome::Connected(WalletKind::WalletconnectV2)
            }
            Err(err) => {
                error!("WalletConnect v2 error: {}", err);
                self.report_failure("WalletConnect failed", &err);
                ConnectOutcome::Failed(err)
            }
        }
    }

    /// Ends the connection. Safe to call while disconnected.
    pub async fn disconnect(&mut self) {
        if let ConnectionState::Connected(conn) = std::mem::take(&mut self.state) {
            info!(address = %conn.address, kind = %conn.kind, "disconnecting wallet");
            teardown(conn).await;
        }
        self.chain_warning = false;
        self.notify();
        self.status.clear_message();
    }

    /// Applies one wallet event to the state.
    ///
    /// Events arriving while disconnected are ignored.
    pub async fn handle_event(&mut self, event: WalletEvent) {
        if !self.state.is_connected() {
            debug!(event = %event, "ignoring wallet event while disconnected");
            return;
        }
        debug!(event = %event, "wallet event");

        match event {
            WalletEvent::AccountsChanged(accounts) => self.on_accounts_changed(accounts).await,
            WalletEvent::ChainChanged(chain) => self.on_chain_changed(&chain),
            WalletEvent::Disconnect => {
                info!("wallet closed the connection");
                self.disconnect().await;
            }
        }
    }

    /// Waits for the next event of the active session and applies it.
    ///
    /// Returns `None` while disconnected or once the wallet stops sending events.
    pub async fn next_event(&mut self) -> Option<WalletEvent> {
        let conn = self.state.active_mut()?;
        let event = conn.events.next().await?;
        self.handle_event(event.clone()).await;
        Some(event)
    }

    /// Applies every event already queued by the wallet, without waiting.
    ///
    /// Returns how many events were applied.
    pub async fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let Some(conn) = self.state.active_mut() else {
                break;
            };
            match conn.events.next().now_or_never() {
                Some(Some(event)) => {
                    self.handle_event(event).await;
                    applied += 1;
                }
                _ => break,
            }
        }
        applied
    }

    async fn on_accounts_changed(&mut self, accounts: Vec<String>) {
        let Some(first) = accounts.first() else {
            info!("wallet reported no accounts");
            self.disconnect().await;
            return;
        };

        let address = match checksum_address(first) {
            Ok(address) => address,
            Err(err) => {
                warn!("Ignoring accountsChanged: {}", err);
                return;
            }
        };

        let decimals = self.config.chain.native_currency.decimals;
        let Some(conn) = self.state.active_mut() else {
            return;
        };
        conn.address = address.clone();
        let provider = Arc::clone(&conn.provider);

        match fetch_balance(provider.as_ref(), &address, decimals).await {
            Ok(balance) => {
                if let Some(conn) = self.state.active_mut() {
                    conn.balance = Some(balance);
                }
            }
            Err(err) => warn!("Balance refresh failed, keeping previous value: {}", err),
        }
        self.notify();
    }

    fn on_chain_changed(&mut self, chain: &str) {
        if parse_chain_id(chain) == Some(self.config.chain.chain_id) {
            self.chain_warning = false;
            self.status.clear_message();
            return;
        }

        warn!(chain, target = %self.config.chain.chain_id_hex(), "wallet left the target chain");
        if !self.chain_warning {
            let text = format!(
                "Please switch back to {} network in your wallet.",
                self.config.chain.network_name()
            );
            self.show_status(&text);
            self.chain_warning = true;
        }
    }

    async fn commit(&mut self, pending: PendingConnection, kind: WalletKind) {
        let events = pending.provider.subscribe();
        let active = ActiveConnection {
            address: pending.address,
            balance: Some(pending.balance),
            kind,
            provider: pending.provider,
            events,
        };
        info!(address = %active.address, kind = %kind, "wallet connected");

        let previous = std::mem::replace(&mut self.state, ConnectionState::Connected(active));
        if let ConnectionState::Connected(old) = previous {
            teardown(old).await;
        }

        self.chain_warning = false;
        self.status.clear_message();
        self.notify();
    }

    fn report_failure(&mut self, prefix: &str, err: &WalletError) {
        let text = match err {
            WalletError::NoAccountsReturned(_) => err.to_string(),
            _ => format!("{prefix}: {err}"),
        };
        self.show_status(&text);
    }

    /// Shows `text` on the status line, replacing any chain warning.
    fn show_status(&mut self, text: &str) {
        self.chain_warning = false;
        self.status.show_message(text);
    }

    fn notify(&mut self) {
        let snapshot = self.state.snapshot();
        self.status.notify_state_changed(&snapshot);
    }
}

/// Builds the WalletConnect init options from configuration.
pub fn walletconnect_options(config: &Config) -> WalletConnectOptions {
    let chain_id = config.chain.chain_id;
    WalletConnectOptions {
        project_id: config.walletconnect.project_id.clone(),
        chains: vec![chain_id],
        show_qr_modal: true,
        rpc_map: HashMap::from([(chain_id, config.chain.rpc_url.clone())]),
        metadata: AppMetadata {
            name: config.walletconnect.app_name.clone(),
            description: config.walletconnect.description.clone(),
            url: config.walletconnect.url.clone(),
            icons: config.walletconnect.icons.clone(),
        },
    }
}

async fn establish_injected(
    provider: Arc<dyn WalletProvider>,
    chain: &ChainConfig,
) -> Result<PendingConnection> {
    ensure_target_chain(provider.as_ref(), chain).await?;

    let accounts = provider
        .request(methods::REQUEST_ACCOUNTS, json!([]))
        .await?;
    let account = first_account(&accounts)
        .ok_or_else(|| WalletError::no_accounts("No accounts returned from wallet."))?;

    let address = checksum_address(account)?;
    let balance =
        fetch_balance(provider.as_ref(), &address, chain.native_currency.decimals).await?;

    Ok(PendingConnection {
        address,
        balance,
        provider,
    })
}

async fn establish_wallet_connect(
    connector: &dyn WalletConnectConnector,
    options: &WalletConnectOptions,
    chain: &ChainConfig,
) -> Result<PendingConnection> {
    let provider = connector.init(options).await?;

    provider
        .request(methods::REQUEST_ACCOUNTS, json!([]))
        .await?;
    let accounts = provider.request(methods::ACCOUNTS, json!([])).await?;
    let account = first_account(&accounts)
        .ok_or_else(|| WalletError::no_accounts("No accounts returned from WalletConnect."))?;

    let address = checksum_address(account)?;
    let balance =
        fetch_balance(provider.as_ref(), &address, chain.native_currency.decimals).await?;

    Ok(PendingConnection {
        address,
        balance,
        provider,
    })
}

/// Reads the native balance of `address` and formats it for display.
pub async fn fetch_balance(
    provider: &dyn WalletProvider,
    address: &str,
    decimals: u8,
) -> Result<String> {
    let balance = provider
        .request(methods::GET_BALANCE, json!([address, "latest"]))
        .await?;
    Ok(format_balance_value(&balance, decimals))
}

fn first_account(accounts: &Value) -> Option<&str> {
    accounts.as_array()?.first()?.as_str()
}

/// Releases a connection; remote teardown failures are logged and dropped.
async fn teardown(conn: ActiveConnection) {
    if let Some(session) = conn.provider.session() {
        if let Err(e) = session.disconnect().await {
            let err = WalletError::RemoteTeardownFailure(e.message);
            warn!("{}", err);
        }
    }
}
