//! Mock wallet for testing and headless mode.
//!
//! Behaves like a small EIP-1193 wallet: it tracks a selected chain, the set of
//! chains it knows, exposed accounts and balances, records every request and can
//! be scripted to fail specific methods.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures::channel::mpsc::{self, UnboundedSender};
use futures::stream::BoxStream;
use futures::StreamExt;
use serde_json::{json, Value};

use super::{
    methods, WalletConnectConnector, WalletConnectOptions, WalletEnvironment, WalletEvent,
    WalletProvider, WalletSession,
};
use crate::error::{Result, RpcError, WalletError, UNRECOGNIZED_CHAIN_CODE};
use crate::format::parse_chain_id;

/// How the mock reports a switch to a chain it does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownChainStyle {
    /// Error code 4902, as MetaMask does.
    #[default]
    Code,
    /// Message only, as some mobile wallets do.
    Message,
}

#[derive(Debug)]
struct MockState {
    chain_id: u64,
    known_chains: HashSet<u64>,
    accounts: Vec<String>,
    default_balance: Value,
    balances: HashMap<String, Value>,
    failures: HashMap<String, RpcError>,
    requests: Vec<(String, Value)>,
    subscribers: Vec<UnboundedSender<WalletEvent>>,
    teardown_calls: usize,
}

/// A scriptable in-memory wallet.
#[derive(Debug)]
pub struct MockWallet {
    state: Mutex<MockState>,
    unknown_chain_style: UnknownChainStyle,
    has_session: bool,
    teardown_error: Option<RpcError>,
}

impl MockWallet {
    /// Creates a wallet on chain 137 with no accounts and a zero balance.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                chain_id: 137,
                known_chains: HashSet::from([137]),
                accounts: Vec::new(),
                default_balance: json!("0x0"),
                balances: HashMap::new(),
                failures: HashMap::new(),
                requests: Vec::new(),
                subscribers: Vec::new(),
                teardown_calls: 0,
            }),
            unknown_chain_style: UnknownChainStyle::Code,
            has_session: false,
            teardown_error: None,
        }
    }

    /// Selects a chain and marks it as known.
    pub fn with_chain(self, chain_id: u64) -> Self {
        {
            let mut state = self.lock();
            state.chain_id = chain_id;
            state.known_chains.insert(chain_id);
        }
        self
    }

    /// Replaces the set of chains the wallet has registered (the selected chain stays known).
    pub fn with_known_chains(self, chains: impl IntoIterator<Item = u64>) -> Self {
        {
            let mut state = self.lock();
            let selected = state.chain_id;
            state.known_chains = chains.into_iter().collect();
            state.known_chains.insert(selected);
        }
        self
    }

    /// Sets the accounts the wallet exposes.
    pub fn with_accounts<I, S>(self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().accounts = accounts.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the balance returned for every account without an explicit one.
    pub fn with_balance(self, quantity: impl Into<Value>) -> Self {
        self.lock().default_balance = quantity.into();
        self
    }

    /// Sets the balance returned for one account.
    pub fn with_account_balance(self, account: &str, quantity: impl Into<Value>) -> Self {
        self.lock()
            .balances
            .insert(account.to_lowercase(), quantity.into());
        self
    }

    /// Makes every call to `method` fail with `error`.
    pub fn with_failure(self, method: &str, error: RpcError) -> Self {
        self.fail(method, error);
        self
    }

    /// Chooses how unknown-chain switches are reported.
    pub fn with_unknown_chain_style(mut self, style: UnknownChainStyle) -> Self {
        self.unknown_chain_style = style;
        self
    }

    /// Exposes a session teardown capability, as WalletConnect sessions do.
    pub fn with_session(mut self) -> Self {
        self.has_session = true;
        self
    }

    /// Exposes a teardown capability that always fails.
    pub fn with_failing_teardown(mut self, error: RpcError) -> Self {
        self.has_session = true;
        self.teardown_error = Some(error);
        self
    }

    /// Makes every call to `method` fail from now on.
    pub fn fail(&self, method: &str, error: RpcError) {
        self.lock().failures.insert(method.to_string(), error);
    }

    /// Stops failing `method`.
    pub fn recover(&self, method: &str) {
        self.lock().failures.remove(method);
    }

    /// Replaces the exposed accounts without emitting an event.
    pub fn set_accounts(&self, accounts: Vec<String>) {
        self.lock().accounts = accounts;
    }

    /// Sets the balance of one account.
    pub fn set_balance(&self, account: &str, quantity: impl Into<Value>) {
        self.lock()
            .balances
            .insert(account.to_lowercase(), quantity.into());
    }

    /// Pushes an event to every live subscriber.
    pub fn emit(&self, event: WalletEvent) {
        let mut state = self.lock();
        match &event {
            WalletEvent::AccountsChanged(accounts) => state.accounts = accounts.clone(),
            WalletEvent::ChainChanged(chain) => {
                if let Some(id) = parse_chain_id(chain) {
                    state.chain_id = id;
                }
            }
            WalletEvent::Disconnect => {}
        }
        state
            .subscribers
            .retain(|tx| tx.unbounded_send(event.clone()).is_ok());
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.lock().requests.clone()
    }

    /// Returns the method names received so far, in order.
    pub fn methods(&self) -> Vec<String> {
        self.lock().requests.iter().map(|(m, _)| m.clone()).collect()
    }

    /// Returns how many times `method` was requested.
    pub fn request_count(&self, method: &str) -> usize {
        self.lock().requests.iter().filter(|(m, _)| m == method).count()
    }

    /// Returns the selected chain id.
    pub fn chain_id(&self) -> u64 {
        self.lock().chain_id
    }

    /// Returns true if the wallet has `chain_id` registered.
    pub fn knows_chain(&self, chain_id: u64) -> bool {
        self.lock().known_chains.contains(&chain_id)
    }

    /// Returns the number of subscribers whose stream is still alive.
    pub fn live_subscribers(&self) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }

    /// Returns how many times the session teardown was invoked.
    pub fn teardown_calls(&self) -> usize {
        self.lock().teardown_calls
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn requested_chain(params: &Value) -> std::result::Result<(u64, String), RpcError> {
        let raw = params
            .get(0)
            .and_then(|p| p.get("chainId"))
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::new(-32602, "Missing chainId"))?;
        let id = parse_chain_id(raw)
            .ok_or_else(|| RpcError::new(-32602, format!("Invalid chainId {raw}")))?;
        Ok((id, raw.to_string()))
    }

    fn switch_chain(&self, params: &Value) -> std::result::Result<Value, RpcError> {
        let (id, raw) = Self::requested_chain(params)?;
        let mut state = self.lock();
        if !state.known_chains.contains(&id) {
            let message = format!(
                "Unrecognized chain ID \"{raw}\". Try adding the chain using wallet_addEthereumChain first."
            );
            return Err(match self.unknown_chain_style {
                UnknownChainStyle::Code => RpcError::new(UNRECOGNIZED_CHAIN_CODE, message),
                UnknownChainStyle::Message => RpcError::message(message),
            });
        }
        if state.chain_id != id {
            state.chain_id = id;
            let event = WalletEvent::ChainChanged(format!("{id:#x}"));
            state
                .subscribers
                .retain(|tx| tx.unbounded_send(event.clone()).is_ok());
        }
        Ok(Value::Null)
    }

    fn add_chain(&self, params: &Value) -> std::result::Result<Value, RpcError> {
        let (id, _) = Self::requested_chain(params)?;
        self.lock().known_chains.insert(id);
        Ok(Value::Null)
    }

    fn balance(&self, params: &Value) -> std::result::Result<Value, RpcError> {
        let account = params
            .get(0)
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::new(-32602, "Missing address"))?
            .to_lowercase();
        let state = self.lock();
        Ok(state
            .balances
            .get(&account)
            .cloned()
            .unwrap_or_else(|| state.default_balance.clone()))
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request(
        &self,
        method: &str,
        params: Value,
    ) -> std::result::Result<Value, RpcError> {
        {
            let mut state = self.lock();
            state.requests.push((method.to_string(), params.clone()));
            if let Some(err) = state.failures.get(method) {
                return Err(err.clone());
            }
        }

        match method {
            methods::CHAIN_ID => Ok(json!(format!("{:#x}", self.chain_id()))),
            methods::REQUEST_ACCOUNTS | methods::ACCOUNTS => Ok(json!(self.lock().accounts)),
            methods::GET_BALANCE => self.balance(&params),
            methods::SWITCH_CHAIN => self.switch_chain(&params),
            methods::ADD_CHAIN => self.add_chain(&params),
            other => Err(RpcError::new(4200, format!("Unsupported method: {other}"))),
        }
    }

    fn subscribe(&self) -> BoxStream<'static, WalletEvent> {
        let (tx, rx) = mpsc::unbounded();
        self.lock().subscribers.push(tx);
        rx.boxed()
    }

    fn session(&self) -> Option<&dyn WalletSession> {
        if self.has_session {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl WalletSession for MockWallet {
    async fn disconnect(&self) -> std::result::Result<(), RpcError> {
        self.lock().teardown_calls += 1;
        match &self.teardown_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// An environment with an optional injected mock wallet.
#[derive(Debug, Clone, Default)]
pub struct MockEnvironment {
    wallet: Option<Arc<MockWallet>>,
}

impl MockEnvironment {
    /// An environment with no injected wallet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// An environment exposing `wallet` as the injected wallet.
    pub fn with_wallet(wallet: Arc<MockWallet>) -> Self {
        Self {
            wallet: Some(wallet),
        }
    }
}

impl WalletEnvironment for MockEnvironment {
    fn injected(&self) -> Option<Arc<dyn WalletProvider>> {
        self.wallet
            .as_ref()
            .map(|w| Arc::clone(w) as Arc<dyn WalletProvider>)
    }
}

/// A WalletConnect connector that pairs instantly with a mock wallet.
#[derive(Debug, Default)]
pub struct MockConnector {
    wallet: Option<Arc<MockWallet>>,
    init_error: Option<WalletError>,
    inits: Mutex<Vec<WalletConnectOptions>>,
}

impl MockConnector {
    /// A connector whose sessions are backed by `wallet`.
    pub fn new(wallet: Arc<MockWallet>) -> Self {
        Self {
            wallet: Some(wallet),
            init_error: None,
            inits: Mutex::new(Vec::new()),
        }
    }

    /// A connector whose pairing always fails with `error`.
    pub fn failing(error: WalletError) -> Self {
        Self {
            wallet: None,
            init_error: Some(error),
            inits: Mutex::new(Vec::new()),
        }
    }

    /// Returns the options of every `init` call so far.
    pub fn inits(&self) -> Vec<WalletConnectOptions> {
        self.inits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl WalletConnectConnector for MockConnector {
    async fn init(&self, options: &WalletConnectOptions) -> Result<Arc<dyn WalletProvider>> {
        self.inits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(options.clone());

        if let Some(err) = &self.init_error {
            return Err(err.clone());
        }
        match &self.wallet {
            Some(wallet) => Ok(Arc::clone(wallet) as Arc<dyn WalletProvider>),
            None => Err(WalletError::unknown("Pairing was not completed")),
        }
    }
}
