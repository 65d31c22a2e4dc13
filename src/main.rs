//! wallet-chip - Wallet connection manager pinned to a single EVM chain.

use std::process::ExitCode;

use serde_json::json;
use tracing::{error, info, warn};

use wallet_chip::cli::{Cli, Command, HeadlessArgs};
use wallet_chip::config::Config;
use wallet_chip::connection::fetch_balance;
use wallet_chip::error::{Result, WalletError};
use wallet_chip::format::{checksum_address, chain_id_from_value};
use wallet_chip::headless::HeadlessRunner;
use wallet_chip::logging;
use wallet_chip::ui::WalletChoice;
use wallet_chip::wallet::{methods, HttpRpcConfig, HttpRpcProvider, WalletProvider};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if cli.log_file {
        logging::init_file_logging();
    } else {
        logging::init_stderr_logging();
    }

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected command; `Ok(false)` means it ran but did not succeed.
async fn run(cli: Cli) -> Result<bool> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_overrides();
    config.validate()?;

    match cli.command {
        Command::Balance { address } => balance(&config, &address).await,
        Command::Chain => chain(&config).await,
        Command::Wallets => {
            wallets(&config);
            Ok(true)
        }
        Command::Headless(args) => headless(config, &args).await,
    }
}

fn rpc_provider(config: &Config) -> Result<HttpRpcProvider> {
    HttpRpcProvider::new(HttpRpcConfig::new(config.chain.rpc_url.clone()))
}

async fn balance(config: &Config, address: &str) -> Result<bool> {
    let address = checksum_address(address)?;
    let provider = rpc_provider(config)?;
    let currency = &config.chain.native_currency;

    let balance = fetch_balance(&provider, &address, currency.decimals).await?;
    println!("{address}: {balance} {}", currency.symbol);
    Ok(true)
}

async fn chain(config: &Config) -> Result<bool> {
    let provider = rpc_provider(config)?;
    let value = provider.request(methods::CHAIN_ID, json!([])).await?;
    let served = chain_id_from_value(&value)
        .ok_or_else(|| WalletError::rpc(format!("Unexpected eth_chainId result: {value}")))?;

    let target = &config.chain;
    if served == target.chain_id {
        println!(
            "{} serves {} (chain {})",
            provider.url(),
            target.name,
            target.chain_id_hex()
        );
        Ok(true)
    } else {
        warn!(served, target = target.chain_id, "RPC endpoint serves another chain");
        println!(
            "{} serves chain {:#x}, expected {} ({})",
            provider.url(),
            served,
            target.name,
            target.chain_id_hex()
        );
        Ok(false)
    }
}

fn wallets(config: &Config) {
    for choice in WalletChoice::ALL {
        let note = match choice {
            WalletChoice::WalletConnect if !config.walletconnect.has_project_id() => {
                " (project id not configured)"
            }
            _ => "",
        };
        println!("{:<14} {}{}", choice.as_str(), choice.label(), note);
    }
}

async fn headless(mut config: Config, args: &HeadlessArgs) -> Result<bool> {
    let headless_config = args.to_headless_config().map_err(WalletError::config)?;
    if let Some(project_id) = &args.project_id {
        config.walletconnect.project_id = project_id.clone();
    }

    let format = headless_config.output_format;
    let mut runner = HeadlessRunner::new(headless_config, config);
    if let Some(events) = &args.events {
        runner.load_events(events)?;
    } else if let Some(script) = &args.script {
        runner.load_script(script)?;
    }

    let result = runner.run().await;
    let output = result.render(format)?;

    match &args.output_file {
        Some(path) => std::fs::write(path, &output).map_err(|e| {
            WalletError::config(format!("Failed to write {}: {e}", path.display()))
        })?,
        None => print!("{output}"),
    }

    if !result.passed() {
        warn!(
            failed = result.assertions_failed,
            "headless run finished with failed assertions"
        );
    }
    Ok(result.passed())
}
