//! UI-facing contract of the connection manager.
//!
//! The manager never renders anything itself. It reports state changes and
//! status-line messages through a [`StatusSink`], and the sink decides how the
//! connect chip and status line are drawn.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info};

use crate::connection::ConnectionSnapshot;
use crate::format::shorten_address;

/// Label of the connect chip while disconnected.
pub const CONNECT_LABEL: &str = "Connect Wallet";

/// Operations the connection manager requires from the UI.
pub trait StatusSink: Send {
    /// The connection state changed; redraw the chip.
    fn notify_state_changed(&mut self, snapshot: &ConnectionSnapshot);

    /// Shows a message in the status line.
    fn show_message(&mut self, text: &str);

    /// Clears the status line.
    fn clear_message(&mut self);
}

/// Renders the connect chip: a call to action, or address and balance.
pub fn chip_label(snapshot: &ConnectionSnapshot, symbol: &str) -> String {
    match &snapshot.address {
        Some(address) => format!(
            "{} · {} {}",
            shorten_address(address),
            snapshot.balance.as_deref().unwrap_or("…"),
            symbol
        ),
        None => CONNECT_LABEL.to_string(),
    }
}

/// Wallet choices offered by the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletChoice {
    Metamask,
    Binance,
    WalletConnect,
}

impl WalletChoice {
    /// All choices, in display order.
    pub const ALL: [Self; 3] = [Self::Metamask, Self::WalletConnect, Self::Binance];

    /// Returns the choice as a string for scripts and the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metamask => "metamask",
            Self::Binance => "binance",
            Self::WalletConnect => "walletconnect",
        }
    }

    /// Returns the label shown on the selector.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Metamask => "MetaMask",
            Self::Binance => "Binance Chain Wallet",
            Self::WalletConnect => "WalletConnect",
        }
    }
}

impl fmt::Display for WalletChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WalletChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metamask" | "injected" => Ok(Self::Metamask),
            "binance" => Ok(Self::Binance),
            "walletconnect" | "wc" | "walletconnect_v2" => Ok(Self::WalletConnect),
            _ => Err(format!(
                "Invalid wallet: {s}. Expected: metamask, binance, or walletconnect"
            )),
        }
    }
}

/// One call made on a [`RecordingStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum StatusCall {
    Notify(ConnectionSnapshot),
    Show(String),
    Clear,
}

/// A sink that remembers what it was told.
///
/// Used by tests and by headless mode, where the final chip and status line are
/// printed after the script has run.
#[derive(Debug, Clone, Default)]
pub struct RecordingStatus {
    calls: Vec<StatusCall>,
    message: Option<String>,
    snapshot: ConnectionSnapshot,
}

impl RecordingStatus {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the message currently in the status line.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the last snapshot received.
    pub fn snapshot(&self) -> &ConnectionSnapshot {
        &self.snapshot
    }

    /// Returns every call, in order.
    pub fn calls(&self) -> &[StatusCall] {
        &self.calls
    }

    /// Returns how many times `text` was shown.
    pub fn times_shown(&self, text: &str) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, StatusCall::Show(t) if t == text))
            .count()
    }

    /// Returns how many state notifications were received.
    pub fn notifications(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, StatusCall::Notify(_)))
            .count()
    }

    /// Forgets recorded calls but keeps the current message and snapshot.
    pub fn reset_calls(&mut self) {
        self.calls.clear();
    }
}

impl StatusSink for RecordingStatus {
    fn notify_state_changed(&mut self, snapshot: &ConnectionSnapshot) {
        self.snapshot = snapshot.clone();
        self.calls.push(StatusCall::Notify(snapshot.clone()));
    }

    fn show_message(&mut self, text: &str) {
        self.message = Some(text.to_string());
        self.calls.push(StatusCall::Show(text.to_string()));
    }

    fn clear_message(&mut self) {
        self.message = None;
        self.calls.push(StatusCall::Clear);
    }
}

/// A sink that reports through `tracing`.
#[derive(Debug, Clone)]
pub struct LogStatus {
    symbol: String,
}

impl LogStatus {
    /// Creates a sink rendering balances with the given currency symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

impl StatusSink for LogStatus {
    fn notify_state_changed(&mut self, snapshot: &ConnectionSnapshot) {
        info!(
            kind = %snapshot.wallet_kind,
            chip = %chip_label(snapshot, &self.symbol),
            "wallet state changed"
        );
    }

    fn show_message(&mut self, text: &str) {
        info!(status = text, "status");
    }

    fn clear_message(&mut self) {
        debug!("status cleared");
    }
}
