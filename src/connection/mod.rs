//! Connection management for wallet-chip.
//!
//! Centralizes the wallet connection lifecycle: connecting, pinning the chain,
//! reacting to wallet events and tearing sessions down.

pub mod chain;
pub mod manager;
pub mod state;

pub use chain::{ensure_target_chain, AddChainParams};
pub use manager::{fetch_balance, walletconnect_options, ConnectOutcome, ConnectionManager};
pub use state::{ConnectionSnapshot, ConnectionState, InjectedKind, WalletKind};
