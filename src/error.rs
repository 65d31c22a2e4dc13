//! Error types for wallet-chip.
//!
//! Defines the error taxonomy for connection, chain and configuration failures.

use thiserror::Error;

/// EIP-1193 code for a request the user rejected.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Wallet code reporting that the requested chain has not been added.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// An error returned by a wallet's `request` interface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RpcError {
    /// Numeric error code, when the wallet provides one.
    pub code: Option<i64>,
    /// Human-readable message.
    pub message: String,
}

impl RpcError {
    /// Creates an error with a code.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    /// Creates an error carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Returns true if the user declined the request in their wallet.
    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(USER_REJECTED_CODE)
    }
}

/// Main error type for wallet-chip operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No injected wallet is reachable from the environment.
    #[error("No injected wallet detected. Install MetaMask or use mobile wallet browsers.")]
    NoWalletDetected,

    /// The WalletConnect project id is unset or still the placeholder.
    #[error("{0}")]
    MisconfiguredCredential(String),

    /// The user declined a chain switch or chain registration.
    #[error("{0}")]
    ChainSwitchRejected(String),

    /// The wallet does not know the target chain.
    #[error("{0}")]
    ChainUnrecognizedByWallet(String),

    /// The wallet returned an empty account list.
    #[error("{0}")]
    NoAccountsReturned(String),

    /// Session teardown on the remote side failed.
    #[error("Teardown failed: {0}")]
    RemoteTeardownFailure(String),

    /// Configuration errors (invalid config file, bad URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport errors talking to a JSON-RPC endpoint.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Any other failure, message passed through verbatim.
    #[error("{0}")]
    Unknown(String),
}

impl WalletError {
    /// Creates a misconfigured credential error with the given message.
    pub fn misconfigured(msg: impl Into<String>) -> Self {
        Self::MisconfiguredCredential(msg.into())
    }

    /// Creates a no-accounts error with the given message.
    pub fn no_accounts(msg: impl Into<String>) -> Self {
        Self::NoAccountsReturned(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an RPC transport error with the given message.
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    /// Creates an unknown error with the given message.
    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::NoWalletDetected => "No Wallet",
            Self::MisconfiguredCredential(_) => "Credential Error",
            Self::ChainSwitchRejected(_) => "Chain Switch Rejected",
            Self::ChainUnrecognizedByWallet(_) => "Unknown Chain",
            Self::NoAccountsReturned(_) => "No Accounts",
            Self::RemoteTeardownFailure(_) => "Teardown Error",
            Self::Config(_) => "Configuration Error",
            Self::Rpc(_) => "RPC Error",
            Self::Unknown(_) => "Error",
        }
    }
}

impl From<RpcError> for WalletError {
    fn from(err: RpcError) -> Self {
        Self::Unknown(err.message)
    }
}

/// Result type alias using WalletError.
pub type Result<T> = std::result::Result<T, WalletError>;
