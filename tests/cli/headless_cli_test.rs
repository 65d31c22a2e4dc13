//! Tests for the `headless` and `wallets` subcommands.

use super::common::run;

#[test]
fn test_headless_connect_text_output() {
    let (code, stdout, _) = run(&[
        "headless",
        "--events",
        "connect:metamask,assert:connected",
        "--balance",
        "0xde0b6b3a7640000",
    ]);

    assert_eq!(code, 0);
    assert!(stdout.starts_with("[0x5aAe…eAed · 1.0000 MATIC]"), "{stdout}");
    assert!(stdout.contains("assertions: 1 passed, 0 failed"));
}

#[test]
fn test_headless_json_output() {
    let (code, stdout, _) = run(&[
        "headless",
        "--events",
        "connect:binance,wallet:chain:0x1",
        "--output",
        "json",
    ]);

    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["state"]["wallet_kind"], "injected-binance");
    assert_eq!(
        json["message"],
        "Please switch back to Polygon network in your wallet."
    );
    assert_eq!(json["events_executed"], 2);
}

#[test]
fn test_headless_assertion_failure_exits_nonzero() {
    let (code, stdout, _) = run(&[
        "headless",
        "--no-injected",
        "--events",
        "connect:metamask,assert:connected",
    ]);

    assert_eq!(code, 1, "Should exit with code 1 on assertion failure");
    assert!(stdout.contains("No injected wallet detected."));
    assert!(stdout.contains("FAILED: connected"));
}

#[test]
fn test_headless_walletconnect_needs_project_id() {
    let (code, stdout, _) = run(&[
        "headless",
        "--events",
        "connect:walletconnect,assert:message:walletconnect.project_id",
    ]);
    assert_eq!(code, 0, "{stdout}");

    let (code, _, _) = run(&[
        "headless",
        "--project-id",
        "cli-project",
        "--events",
        "connect:walletconnect,assert:kind:walletconnect-v2",
    ]);
    assert_eq!(code, 0);
}

#[test]
fn test_headless_unknown_chain_is_added() {
    let (code, stdout, _) = run(&[
        "headless",
        "--chain",
        "1",
        "--unknown-chain",
        "--events",
        "connect:metamask,assert:connected,assert:no-message",
    ]);
    assert_eq!(code, 0, "{stdout}");
}

#[test]
fn test_headless_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.json");

    let (code, stdout, _) = run(&[
        "headless",
        "--events",
        "disconnect,assert:disconnected",
        "--output",
        "json",
        "--output-file",
        path.to_str().unwrap(),
    ]);

    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains(r#""chip": "Connect Wallet""#));
}

#[test]
fn test_headless_requires_events() {
    let (code, _, stderr) = run(&["headless"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("requires --events or --script"));
}

#[test]
fn test_wallets_lists_choices() {
    let (code, stdout, _) = run(&["wallets"]);

    assert_eq!(code, 0);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("metamask"));
    assert!(lines[1].contains("WalletConnect (project id not configured)"));
    assert!(lines[2].contains("Binance Chain Wallet"));
}
