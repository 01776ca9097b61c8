//! Error types shared by every SDK transport.

use thiserror::Error;

use crate::rpc::JsonRpcError;

/// Errors returned by SDK operations.
///
/// Setup failures (HTTP dispatch, queue connect, consumer bind) are returned
/// to the caller. Per-message failures never surface here; they are logged by
/// the delivery loop and the message is left for the broker to redeliver.
#[derive(Debug, Error)]
pub enum SdkError {
    /// HTTP request failed (connection refused, timeout, non-2xx status).
    #[error("HTTP error: {0}")]
    Http(String),

    /// A response or message payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A request body could not be serialized.
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Contract address is not a valid field element.
    #[error("invalid contract address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// A value is not a valid field element.
    #[error("invalid felt: {0}")]
    InvalidFelt(String),

    /// JSON-RPC error returned by the node (e.g. contract revert).
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Connecting to the message queue failed.
    #[error("connect error: {0}")]
    Connect(String),

    /// Creating, consuming or deleting a durable consumer failed.
    #[error("consumer error: {0}")]
    Consumer(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SdkError {
    /// Returns `true` if this is a node-side execution error.
    pub fn is_rpc_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Http(e.to_string())
        }
    }
}

pub type Result<T, E = SdkError> = std::result::Result<T, E>;
