//! Wallet capability contracts.
//!
//! The connection manager never talks to a concrete wallet. It depends on the
//! request/event surface every EIP-1193 wallet exposes, plus an optional
//! session-teardown capability that only remote sessions provide.

pub mod http;
pub mod mock;

pub use http::{HttpRpcConfig, HttpRpcProvider};
pub use mock::{MockConnector, MockEnvironment, MockWallet};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, RpcError};

/// JSON-RPC methods the connection manager issues.
pub mod methods {
    pub const CHAIN_ID: &str = "eth_chainId";
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const GET_BALANCE: &str = "eth_getBalance";
    pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
    pub const ADD_CHAIN: &str = "wallet_addEthereumChain";
}

/// An event pushed by a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The set of exposed accounts changed; empty means the user disconnected.
    AccountsChanged(Vec<String>),
    /// The selected chain changed, as reported by the wallet.
    ChainChanged(String),
    /// The wallet ended the connection.
    Disconnect,
}

impl WalletEvent {
    /// Returns the EIP-1193 event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AccountsChanged(_) => "accountsChanged",
            Self::ChainChanged(_) => "chainChanged",
            Self::Disconnect => "disconnect",
        }
    }
}

impl fmt::Display for WalletEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccountsChanged(accounts) => write!(f, "accountsChanged({})", accounts.join(",")),
            Self::ChainChanged(chain) => write!(f, "chainChanged({chain})"),
            Self::Disconnect => write!(f, "disconnect"),
        }
    }
}

/// Request/event interface of a connected wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Sends a JSON-RPC request to the wallet.
    async fn request(
        &self,
        method: &str,
        params: Value,
    ) -> std::result::Result<Value, RpcError>;

    /// Subscribes to wallet events.
    ///
    /// Each call returns an independent stream; dropping it unsubscribes.
    fn subscribe(&self) -> BoxStream<'static, WalletEvent>;

    /// Returns the teardown capability for wallets backed by a remote session.
    fn session(&self) -> Option<&dyn WalletSession> {
        None
    }
}

/// Teardown capability of a remote wallet session.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Ends the session on the remote side.
    async fn disconnect(&self) -> std::result::Result<(), RpcError>;
}

/// The execution environment a page-injected wallet is discovered in.
pub trait WalletEnvironment: Send + Sync {
    /// Returns the injected wallet, if one is present.
    fn injected(&self) -> Option<Arc<dyn WalletProvider>>;
}

/// Options passed to WalletConnect when initialising a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnectOptions {
    pub project_id: String,
    pub chains: Vec<u64>,
    pub show_qr_modal: bool,
    pub rpc_map: HashMap<u64, String>,
    pub metadata: AppMetadata,
}

/// Application metadata shown in the wallet during pairing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
    pub icons: Vec<String>,
}

/// Establishes WalletConnect v2 sessions.
///
/// `init` may present a pairing UI and suspends until the user finishes or
/// abandons the handshake.
#[async_trait]
pub trait WalletConnectConnector: Send + Sync {
    /// Initialises a session and returns its provider.
    async fn init(&self, options: &WalletConnectOptions) -> Result<Arc<dyn WalletProvider>>;
}
