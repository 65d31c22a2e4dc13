//! Common test utilities for binary tests.

use std::path::PathBuf;
use std::process::Command;

/// Path to a config file that does not exist, so defaults apply.
fn missing_config() -> PathBuf {
    std::env::temp_dir().join("wallet-chip-tests-absent").join("config.toml")
}

/// Runs the wallet-chip binary with the given arguments and a default config.
pub fn run(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_wallet-chip"))
        .args(args)
        .arg("--config")
        .arg(missing_config())
        .env_remove("WALLETCONNECT_PROJECT_ID")
        .env_remove("WALLET_CHIP_RPC_URL")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}
