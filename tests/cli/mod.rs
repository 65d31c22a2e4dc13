//! Tests that run the `wallet-chip` binary.

pub mod common;
pub mod headless_cli_test;
