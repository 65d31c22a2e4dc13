//! Configuration management for wallet-chip.
//!
//! Handles loading configuration from TOML files and environment variables.
//! Every field has a default, so a missing file yields a Polygon mainnet setup
//! with the WalletConnect project id left as a placeholder.

use crate::error::{Result, WalletError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Placeholder shipped in the default config; treated as "not configured".
pub const PROJECT_ID_PLACEHOLDER: &str = "YOUR_WALLETCONNECT_PROJECT_ID";

/// Environment variable overriding the WalletConnect project id.
pub const PROJECT_ID_ENV: &str = "WALLETCONNECT_PROJECT_ID";

/// Environment variable overriding the chain RPC URL.
pub const RPC_URL_ENV: &str = "WALLET_CHIP_RPC_URL";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Target chain the wallet is pinned to.
    #[serde(default)]
    pub chain: ChainConfig,

    /// WalletConnect v2 settings.
    #[serde(default)]
    pub walletconnect: WalletConnectConfig,
}

/// Descriptor of the target chain, as registered with wallets that lack it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChainConfig {
    /// Chain id (decimal).
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Display name shown by wallets and in status messages.
    #[serde(default = "default_chain_name")]
    pub name: String,

    /// JSON-RPC endpoint.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Block explorer base URL.
    #[serde(default = "default_explorer_url")]
    pub block_explorer_url: String,

    /// Native currency metadata.
    #[serde(default)]
    pub native_currency: NativeCurrency,
}

/// Native currency metadata for a chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for NativeCurrency {
    fn default() -> Self {
        Self {
            name: "MATIC".to_string(),
            symbol: "MATIC".to_string(),
            decimals: 18,
        }
    }
}

fn default_chain_id() -> u64 {
    137
}

fn default_chain_name() -> String {
    "Polygon Mainnet".to_string()
}

fn default_rpc_url() -> String {
    "https://polygon-rpc.com/".to_string()
}

fn default_explorer_url() -> String {
    "https://polygonscan.com".to_string()
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            name: default_chain_name(),
            rpc_url: default_rpc_url(),
            block_explorer_url: default_explorer_url(),
            native_currency: NativeCurrency::default(),
        }
    }
}

impl ChainConfig {
    /// Returns the chain id as a lowercase `0x`-prefixed hex string.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    /// Returns the short network name used in user-facing prompts ("Polygon").
    pub fn network_name(&self) -> &str {
        self.name
            .strip_suffix(" Mainnet")
            .unwrap_or(&self.name)
    }
}

/// WalletConnect v2 settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalletConnectConfig {
    /// Cloud project identifier.
    #[serde(default = "default_project_id")]
    pub project_id: String,

    /// Application name shown in the wallet during pairing.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Application description shown during pairing.
    #[serde(default = "default_description")]
    pub description: String,

    /// Origin URL of the application.
    #[serde(default = "default_app_url")]
    pub url: String,

    /// Icon URLs.
    #[serde(default)]
    pub icons: Vec<String>,
}

fn default_project_id() -> String {
    PROJECT_ID_PLACEHOLDER.to_string()
}

fn default_app_name() -> String {
    "My Project".to_string()
}

fn default_description() -> String {
    "Connect to Polygon via WalletConnect v2".to_string()
}

fn default_app_url() -> String {
    "http://localhost".to_string()
}

impl Default for WalletConnectConfig {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            app_name: default_app_name(),
            description: default_description(),
            url: default_app_url(),
            icons: Vec::new(),
        }
    }
}

impl WalletConnectConfig {
    /// Returns true if a real project id has been configured.
    pub fn has_project_id(&self) -> bool {
        let id = self.project_id.trim();
        !id.is_empty() && id != PROJECT_ID_PLACEHOLDER
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wallet-chip")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file, falling back to defaults if it does not exist.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| WalletError::config(format!("Failed to read config file: {e}")))?;

        let config = Self::parse_toml(&content, path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            WalletError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies `WALLETCONNECT_PROJECT_ID` and `WALLET_CHIP_RPC_URL` if set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var(PROJECT_ID_ENV) {
            if !id.trim().is_empty() {
                self.walletconnect.project_id = id;
            }
        }
        if let Ok(rpc) = std::env::var(RPC_URL_ENV) {
            if !rpc.trim().is_empty() {
                self.chain.rpc_url = rpc;
            }
        }
    }

    /// Checks that URLs are well-formed and the chain id is usable.
    pub fn validate(&self) -> Result<()> {
        if self.chain.chain_id == 0 {
            return Err(WalletError::config("chain_id must be non-zero"));
        }
        Url::parse(&self.chain.rpc_url)
            .map_err(|e| WalletError::config(format!("Invalid rpc_url: {e}")))?;
        Url::parse(&self.chain.block_explorer_url)
            .map_err(|e| WalletError::config(format!("Invalid block_explorer_url: {e}")))?;
        Ok(())
    }
}
