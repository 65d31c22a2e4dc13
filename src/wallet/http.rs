//! JSON-RPC over HTTP provider.
//!
//! Read-only access to a chain's public RPC endpoint. It answers the same
//! `request` surface as a wallet, so balance and chain-id reads can share code
//! with connected wallets, but it never pushes events and holds no accounts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{WalletEvent, WalletProvider};
use crate::error::{Result, RpcError, WalletError};

/// Default timeout for RPC requests.
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// HTTP provider configuration.
#[derive(Debug, Clone)]
pub struct HttpRpcConfig {
    /// Endpoint URL.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl HttpRpcConfig {
    /// Creates a config for the given endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// A provider backed by a JSON-RPC HTTP endpoint.
#[derive(Debug)]
pub struct HttpRpcProvider {
    config: HttpRpcConfig,
    client: Client,
    next_id: AtomicU64,
}

impl HttpRpcProvider {
    /// Creates a provider with the given configuration.
    pub fn new(config: HttpRpcConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WalletError::rpc(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Returns the endpoint URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorBody {
    code: i64,
    message: String,
}

impl JsonRpcResponse {
    fn into_result(self) -> std::result::Result<Value, RpcError> {
        if let Some(err) = self.error {
            return Err(RpcError::new(err.code, err.message));
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl WalletProvider for HttpRpcProvider {
    async fn request(
        &self,
        method: &str,
        params: Value,
    ) -> std::result::Result<Value, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, url = %self.config.url, "JSON-RPC request");

        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RpcError::message("Request timed out. Try again.")
                } else if e.is_connect() {
                    RpcError::message(format!("Failed to connect to {}", self.config.url))
                } else {
                    RpcError::message(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RpcError::message(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(RpcError::message(format!("RPC endpoint error ({status}): {body}")));
        }

        let response: JsonRpcResponse = serde_json::from_str(&body)
            .map_err(|e| RpcError::message(format!("Failed to parse response: {e}")))?;

        response.into_result()
    }

    fn subscribe(&self) -> BoxStream<'static, WalletEvent> {
        stream::empty().boxed()
    }
}
