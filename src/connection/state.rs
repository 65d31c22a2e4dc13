//! Connection state owned by the connection manager.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures::stream::BoxStream;
use serde::Serialize;

use crate::wallet::{WalletEvent, WalletProvider};

/// Which wallet backs the current connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalletKind {
    #[default]
    None,
    InjectedMetamask,
    InjectedBinance,
    WalletconnectV2,
}

impl WalletKind {
    /// Returns the kind as a string for display and scripts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::InjectedMetamask => "injected-metamask",
            Self::InjectedBinance => "injected-binance",
            Self::WalletconnectV2 => "walletconnect-v2",
        }
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WalletKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "injected-metamask" | "metamask" => Ok(Self::InjectedMetamask),
            "injected-binance" | "binance" => Ok(Self::InjectedBinance),
            "walletconnect-v2" | "walletconnect" => Ok(Self::WalletconnectV2),
            _ => Err(format!("Unknown wallet kind: {s}")),
        }
    }
}

/// Injected wallets the user can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedKind {
    Metamask,
    Binance,
}

impl InjectedKind {
    /// Returns the wallet kind a successful connect records.
    pub fn wallet_kind(self) -> WalletKind {
        match self {
            Self::Metamask => WalletKind::InjectedMetamask,
            Self::Binance => WalletKind::InjectedBinance,
        }
    }

    /// Status text shown while connecting.
    pub fn connecting_message(self) -> &'static str {
        match self {
            Self::Metamask => "Connecting to injected wallet...",
            Self::Binance => "Connecting to Binance Chain Wallet...",
        }
    }
}

/// A live wallet connection.
///
/// Holding one implies an address and a wallet kind, so a connected state
/// without either cannot be built.
pub struct ActiveConnection {
    /// Checksummed account address.
    pub address: String,
    /// Formatted native balance.
    pub balance: Option<String>,
    /// Wallet backing the connection.
    pub kind: WalletKind,
    /// Request/event handle of the wallet.
    pub(crate) provider: Arc<dyn WalletProvider>,
    /// Event subscription for this session.
    pub(crate) events: BoxStream<'static, WalletEvent>,
}

impl fmt::Debug for ActiveConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveConnection")
            .field("address", &self.address)
            .field("balance", &self.balance)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// The sole connection record.
#[derive(Debug, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected(ActiveConnection),
}

impl ConnectionState {
    /// Returns the connected address, if any.
    pub fn address(&self) -> Option<&str> {
        self.active().map(|c| c.address.as_str())
    }

    /// Returns the formatted balance, if any.
    pub fn balance_display(&self) -> Option<&str> {
        self.active().and_then(|c| c.balance.as_deref())
    }

    /// Returns the wallet kind, `None` while disconnected.
    pub fn wallet_kind(&self) -> WalletKind {
        self.active().map_or(WalletKind::None, |c| c.kind)
    }

    /// Returns the wallet handle, if connected.
    pub fn rpc_handle(&self) -> Option<&Arc<dyn WalletProvider>> {
        self.active().map(|c| &c.provider)
    }

    /// Check if there's an active connection.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    pub(crate) fn active(&self) -> Option<&ActiveConnection> {
        match self {
            Self::Connected(conn) => Some(conn),
            Self::Disconnected => None,
        }
    }

    pub(crate) fn active_mut(&mut self) -> Option<&mut ActiveConnection> {
        match self {
            Self::Connected(conn) => Some(conn),
            Self::Disconnected => None,
        }
    }

    /// Returns a plain copy of the observable fields.
    pub fn snapshot(&self) -> ConnectionSnapshot {
        ConnectionSnapshot {
            address: self.address().map(String::from),
            balance: self.balance_display().map(String::from),
            wallet_kind: self.wallet_kind(),
        }
    }
}

/// Observable fields of the connection, handed to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionSnapshot {
    pub address: Option<String>,
    pub balance: Option<String>,
    pub wallet_kind: WalletKind,
}

impl ConnectionSnapshot {
    /// Check if the snapshot shows a connection.
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}
