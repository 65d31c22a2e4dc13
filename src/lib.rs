//! wallet-chip - Wallet connection manager pinned to a single EVM chain.
//!
//! This library exposes the core modules for use by the binary and
//! integration tests.

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod format;
pub mod headless;
pub mod logging;
pub mod ui;
pub mod wallet;
