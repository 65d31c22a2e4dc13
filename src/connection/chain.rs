//! Pinning a wallet to the target chain.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::{ChainConfig, NativeCurrency};
use crate::error::{Result, RpcError, WalletError, UNRECOGNIZED_CHAIN_CODE};
use crate::format::chain_id_from_value;
use crate::wallet::{methods, WalletProvider};

/// Parameters of `wallet_addEthereumChain` (EIP-3085).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl From<&ChainConfig> for AddChainParams {
    fn from(chain: &ChainConfig) -> Self {
        Self {
            chain_id: chain.chain_id_hex(),
            chain_name: chain.name.clone(),
            native_currency: chain.native_currency.clone(),
            rpc_urls: vec![chain.rpc_url.clone()],
            block_explorer_urls: vec![chain.block_explorer_url.clone()],
        }
    }
}

fn unrecognized_chain_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)unrecognized chain").expect("static pattern"))
}

/// Returns true if a switch failed because the wallet does not know the chain.
pub fn is_unrecognized_chain(err: &RpcError) -> bool {
    err.code == Some(UNRECOGNIZED_CHAIN_CODE) || unrecognized_chain_pattern().is_match(&err.message)
}

/// Makes sure the wallet is on the target chain.
///
/// Does nothing when the wallet already reports the target. Otherwise asks for
/// a switch; if the wallet does not know the chain it is registered with the
/// configured descriptor and the switch is retried once. Every other failure is
/// returned unchanged.
pub async fn ensure_target_chain(provider: &dyn WalletProvider, chain: &ChainConfig) -> Result<()> {
    let current = provider.request(methods::CHAIN_ID, json!([])).await?;
    if chain_id_from_value(&current) == Some(chain.chain_id) {
        debug!(chain_id = chain.chain_id, "wallet already on target chain");
        return Ok(());
    }

    let target = chain.chain_id_hex();
    info!(current = %current, target = %target, "requesting chain switch");

    match switch_chain(provider, &target).await {
        Ok(()) => Ok(()),
        Err(err) if is_unrecognized_chain(&err) => {
            info!(target = %target, "wallet does not know the chain, registering it");
            register_and_switch(provider, chain, &target)
                .await
                .map_err(|err| {
                    warn!("Failed to add {}: {}", chain.name, err);
                    if is_unrecognized_chain(&err) {
                        WalletError::ChainUnrecognizedByWallet(err.message)
                    } else {
                        switch_error(err)
                    }
                })
        }
        Err(err) => Err(switch_error(err)),
    }
}

/// Maps a failed switch or registration; a user rejection becomes `ChainSwitchRejected`.
fn switch_error(err: RpcError) -> WalletError {
    if err.is_user_rejection() {
        WalletError::ChainSwitchRejected(err.message)
    } else {
        err.into()
    }
}

async fn switch_chain(provider: &dyn WalletProvider, target: &str) -> std::result::Result<(), RpcError> {
    provider
        .request(methods::SWITCH_CHAIN, json!([{ "chainId": target }]))
        .await
        .map(|_: Value| ())
}

async fn register_and_switch(
    provider: &dyn WalletProvider,
    chain: &ChainConfig,
    target: &str,
) -> std::result::Result<(), RpcError> {
    let params = AddChainParams::from(chain);
    provider.request(methods::ADD_CHAIN, json!([params])).await?;
    switch_chain(provider, target).await
}
