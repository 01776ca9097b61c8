//! JSON-RPC provider seam used by [`Contract::call`](crate::types::Contract::call).
//!
//! - [`RpcProvider`] — the async trait a node connection implements
//! - [`HttpRpcProvider`] — single-attempt HTTP transport backed by `reqwest`
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`] — wire types

mod http;
mod request;

pub use http::{HttpProviderConfig, HttpRpcProvider};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::SdkError;

/// A connection to a Starknet JSON-RPC node.
///
/// Object safe; share it as `Arc<dyn RpcProvider>` or pass `&dyn RpcProvider`.
#[async_trait]
pub trait RpcProvider: Send + Sync {
    /// Send one request and return the raw response envelope.
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, SdkError>;

    /// Endpoint identifier, used in logs.
    fn url(&self) -> &str;
}

impl dyn RpcProvider + '_ {
    /// Call `method` with positional `params` and deserialize the result.
    ///
    /// A JSON-RPC error object in the response becomes [`SdkError::Rpc`].
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, SdkError> {
        let resp = self.send(JsonRpcRequest::new(1, method, params)).await?;
        let result = resp.into_result().map_err(SdkError::Rpc)?;
        serde_json::from_value(result).map_err(|e| SdkError::Decode(e.to_string()))
    }
}
