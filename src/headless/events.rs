//! Event DSL parser for headless mode.
//!
//! Parses event strings like "connect:metamask", "wallet:chain:0x1",
//! "assert:connected" into executable events.

use std::fmt;
use std::time::Duration;

use crate::connection::{ConnectionSnapshot, WalletKind};
use crate::error::{Result, WalletError};
use crate::ui::WalletChoice;

/// An assertion to check against the chip, status line or state.
#[derive(Debug, Clone, PartialEq)]
pub enum Assertion {
    /// A wallet is connected.
    Connected,
    /// No wallet is connected.
    Disconnected,
    /// The connected wallet kind equals the value.
    Kind(WalletKind),
    /// The connected address equals the value.
    Address(String),
    /// The displayed balance equals the value.
    Balance(String),
    /// The status line contains the text (case-insensitive).
    Message(String),
    /// The status line is empty.
    NoMessage,
    /// The chip label matches a regex pattern.
    Chip(String),
}

impl Assertion {
    /// Checks the assertion against the rendered chip, status line and state.
    pub fn check(&self, chip: &str, message: Option<&str>, snapshot: &ConnectionSnapshot) -> bool {
        match self {
            Self::Connected => snapshot.is_connected(),
            Self::Disconnected => !snapshot.is_connected(),
            Self::Kind(kind) => snapshot.wallet_kind == *kind,
            Self::Address(address) => snapshot
                .address
                .as_deref()
                .is_some_and(|a| a.eq_ignore_ascii_case(address)),
            Self::Balance(balance) => snapshot.balance.as_deref() == Some(balance.as_str()),
            Self::Message(text) => message
                .is_some_and(|m| m.to_lowercase().contains(&text.to_lowercase())),
            Self::NoMessage => message.is_none(),
            Self::Chip(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(chip))
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Kind(kind) => write!(f, "kind:{kind}"),
            Self::Address(a) => write!(f, "address:{a}"),
            Self::Balance(b) => write!(f, "balance:{b}"),
            Self::Message(t) => write!(f, "message:{t}"),
            Self::NoMessage => write!(f, "no-message"),
            Self::Chip(p) => write!(f, "chip:{p}"),
        }
    }
}

/// A parsed event that can be executed.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The user picks a wallet in the selector.
    Connect(WalletChoice),
    /// The user clicks the connected chip.
    Disconnect,
    /// The wallet reports new accounts.
    WalletAccounts(Vec<String>),
    /// The wallet reports a new chain.
    WalletChain(String),
    /// The wallet ends the session.
    WalletDisconnect,
    /// Wait for a duration.
    Wait(Duration),
    /// Assert something about the chip, status line or state.
    Assert(Assertion),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(choice) => write!(f, "connect:{choice}"),
            Self::Disconnect => write!(f, "disconnect"),
            Self::WalletAccounts(accounts) => write!(f, "wallet:accounts:{}", accounts.join(";")),
            Self::WalletChain(chain) => write!(f, "wallet:chain:{chain}"),
            Self::WalletDisconnect => write!(f, "wallet:disconnect"),
            Self::Wait(d) => write!(f, "wait:{}ms", d.as_millis()),
            Self::Assert(a) => write!(f, "assert:{a}"),
        }
    }
}

/// Parser for the event DSL.
#[derive(Debug, Default)]
pub struct EventParser;

impl EventParser {
    /// Creates a new event parser.
    pub fn new() -> Self {
        Self
    }

    /// Parses all events from an input string.
    /// Supports comma-separated and newline-separated events.
    pub fn parse_all(&self, input: &str) -> Result<Vec<Event>> {
        let mut events = Vec::new();

        for line in input.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            for part in line.split(',') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }

                events.push(self.parse_one(part)?);
            }
        }

        Ok(events)
    }

    /// Parses a single event string.
    pub fn parse_one(&self, input: &str) -> Result<Event> {
        let input = input.trim();

        let (event_type, value) = match input.split_once(':') {
            Some((t, v)) => (t.trim().to_lowercase(), v.trim()),
            None => (input.to_lowercase(), ""),
        };

        match event_type.as_str() {
            "connect" => value
                .parse::<WalletChoice>()
                .map(Event::Connect)
                .map_err(WalletError::config),
            "disconnect" => Ok(Event::Disconnect),
            "wallet" => self.parse_wallet(value),
            "wait" => self.parse_wait(value),
            "assert" => self.parse_assert(value),
            _ => Err(WalletError::config(format!(
                "Unknown event type: '{}'. Valid types: connect, disconnect, wallet, wait, assert",
                event_type
            ))),
        }
    }

    /// Parses a wallet-side event like "accounts:0xabc;0xdef", "chain:0x1", "disconnect".
    fn parse_wallet(&self, value: &str) -> Result<Event> {
        let (kind, arg) = match value.split_once(':') {
            Some((k, a)) => (k.trim().to_lowercase(), a.trim()),
            None => (value.trim().to_lowercase(), ""),
        };

        match kind.as_str() {
            "accounts" => Ok(Event::WalletAccounts(
                arg.split(';')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(String::from)
                    .collect(),
            )),
            "chain" if !arg.is_empty() => Ok(Event::WalletChain(arg.to_string())),
            "chain" => Err(WalletError::config("wallet:chain requires a chain id")),
            "disconnect" => Ok(Event::WalletDisconnect),
            _ => Err(WalletError::config(format!(
                "Unknown wallet event: '{}'. Valid events: accounts, chain, disconnect",
                kind
            ))),
        }
    }

    /// Parses a wait duration like "100ms", "2s", or just "100" (defaults to ms).
    fn parse_wait(&self, value: &str) -> Result<Event> {
        let value = value.trim().to_lowercase();
        let invalid = || WalletError::config(format!("Invalid duration: '{}'", value));

        let duration = if let Some(ms) = value.strip_suffix("ms") {
            Duration::from_millis(ms.parse().map_err(|_| invalid())?)
        } else if let Some(secs) = value.strip_suffix('s') {
            Duration::from_secs(secs.parse().map_err(|_| invalid())?)
        } else {
            Duration::from_millis(value.parse().map_err(|_| invalid())?)
        };

        Ok(Event::Wait(duration))
    }

    /// Parses an assertion like "connected", "kind:injected-metamask", "message:switch".
    fn parse_assert(&self, value: &str) -> Result<Event> {
        let (kind, arg) = match value.split_once(':') {
            Some((k, a)) => (k.trim().to_lowercase(), a.trim()),
            None => (value.trim().to_lowercase(), ""),
        };

        let assertion = match kind.as_str() {
            "connected" => Assertion::Connected,
            "disconnected" => Assertion::Disconnected,
            "kind" => Assertion::Kind(arg.parse().map_err(WalletError::config)?),
            "address" => Assertion::Address(arg.to_string()),
            "balance" => Assertion::Balance(arg.to_string()),
            "message" => Assertion::Message(arg.to_string()),
            "no-message" => Assertion::NoMessage,
            "chip" => {
                regex::Regex::new(arg).map_err(|e| {
                    WalletError::config(format!("Invalid chip pattern '{}': {}", arg, e))
                })?;
                Assertion::Chip(arg.to_string())
            }
            _ => {
                return Err(WalletError::config(format!(
                    "Unknown assertion: '{}'. Valid: connected, disconnected, kind, address, balance, message, no-message, chip",
                    kind
                )))
            }
        };

        Ok(Event::Assert(assertion))
    }
}
