//! Library-level integration tests.

pub mod config_test;
pub mod connection_flow_test;
pub mod headless_runner_test;
pub mod rpc_test;
