//! Command-line argument parsing for wallet-chip.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::headless::{HeadlessConfig, HeadlessWallet, OutputFormat};

/// Connects to browser and WalletConnect wallets pinned to a single chain.
#[derive(Parser, Debug)]
#[command(name = "wallet-chip")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Write logs to the state directory instead of stderr
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read the native balance of an address from the configured RPC endpoint
    Balance {
        /// Address to query
        #[arg(value_name = "ADDRESS")]
        address: String,
    },

    /// Check which chain the configured RPC endpoint serves
    Chain,

    /// List the wallets the selector offers
    Wallets,

    /// Run a scripted session against a simulated wallet
    Headless(HeadlessArgs),
}

/// Arguments of the `headless` subcommand.
#[derive(Args, Debug)]
pub struct HeadlessArgs {
    /// Comma-separated events (e.g., "connect:metamask,assert:connected")
    #[arg(long, value_name = "EVENTS")]
    pub events: Option<String>,

    /// Path to script file with events (use "-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub script: Option<String>,

    /// Accounts exposed by the simulated wallet, in order
    #[arg(
        long,
        value_name = "ADDRESS",
        value_delimiter = ',',
        default_value = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"
    )]
    pub accounts: Vec<String>,

    /// Chain the simulated wallet starts on (hex or decimal)
    #[arg(long, value_name = "CHAIN_ID", default_value = "0x89")]
    pub chain: String,

    /// Balance of every account, as an RPC hex quantity in base units
    #[arg(long, value_name = "QUANTITY", default_value = "0x0")]
    pub balance: String,

    /// The simulated wallet does not know the target chain yet
    #[arg(long)]
    pub unknown_chain: bool,

    /// Simulate a page without an injected wallet
    #[arg(long)]
    pub no_injected: bool,

    /// WalletConnect project id (overrides config)
    #[arg(long, value_name = "ID", env = "WALLETCONNECT_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub output: String,

    /// Write output to file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Stop on first assertion failure
    #[arg(long)]
    pub fail_fast: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }
}

impl HeadlessArgs {
    /// Parses the output format from the --output argument.
    pub fn parse_output_format(&self) -> std::result::Result<OutputFormat, String> {
        self.output.parse()
    }

    /// Validates the arguments.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.events.is_none() && self.script.is_none() {
            return Err("headless requires --events or --script".to_string());
        }
        if self.accounts.iter().any(|a| a.trim().is_empty()) {
            return Err("--accounts must not contain empty entries".to_string());
        }
        crate::format::parse_chain_id(&self.chain)
            .ok_or_else(|| format!("Invalid chain id: '{}'", self.chain))?;
        crate::format::parse_quantity(&self.balance)
            .ok_or_else(|| format!("Invalid balance quantity: '{}'", self.balance))?;
        self.parse_output_format()?;
        Ok(())
    }

    /// Builds the runner configuration; call [`HeadlessArgs::validate`] first.
    pub fn to_headless_config(&self) -> std::result::Result<HeadlessConfig, String> {
        self.validate()?;
        let chain_id = crate::format::parse_chain_id(&self.chain)
            .ok_or_else(|| format!("Invalid chain id: '{}'", self.chain))?;

        Ok(HeadlessConfig {
            wallet: HeadlessWallet {
                accounts: self.accounts.iter().map(|a| a.trim().to_string()).collect(),
                chain_id,
                balance: self.balance.clone(),
                knows_target_chain: !self.unknown_chain,
                injected: !self.no_injected,
            },
            output_format: self.parse_output_format()?,
            fail_fast: self.fail_fast,
        })
    }
}
