//! Read-only contract calls (`starknet_call`).

use serde::Serialize;
use serde_json::Value;

use crate::error::SdkError;
use crate::felt::{selector_from_name, Felt};
use crate::rpc::RpcProvider;
use crate::types::Contract;

/// The `request` object of `starknet_call`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionCall {
    pub contract_address: Felt,
    pub entry_point_selector: Felt,
    pub calldata: Vec<Felt>,
}

/// Block to execute a call against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockId {
    Latest,
    Pending,
    Number(u64),
}

impl BlockId {
    fn to_json(self) -> Value {
        match self {
            Self::Latest => Value::String("latest".into()),
            Self::Pending => Value::String("pending".into()),
            Self::Number(n) => serde_json::json!({ "block_number": n }),
        }
    }
}

impl Contract {
    /// Parsed form of [`Contract::address`].
    pub fn felt_address(&self) -> Result<Felt, SdkError> {
        Felt::from_hex(&self.address).map_err(|e| SdkError::InvalidAddress {
            address: self.address.clone(),
            reason: e.to_string(),
        })
    }

    /// Build the `starknet_call` request for `function` on this contract.
    pub fn function_call(&self, function: &str, calldata: &[Felt]) -> Result<FunctionCall, SdkError> {
        Ok(FunctionCall {
            contract_address: self.felt_address()?,
            entry_point_selector: selector_from_name(function),
            calldata: calldata.to_vec(),
        })
    }

    /// Execute a view function at the latest block and return its result felts.
    ///
    /// Node-side failures such as a revert or an unknown entry point come back
    /// as [`SdkError::Rpc`] carrying the node's error object.
    pub async fn call(
        &self,
        provider: &dyn RpcProvider,
        function: &str,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>, SdkError> {
        self.call_at(provider, BlockId::Latest, function, calldata).await
    }

    /// Like [`Contract::call`], against an explicit block.
    pub async fn call_at(
        &self,
        provider: &dyn RpcProvider,
        block: BlockId,
        function: &str,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>, SdkError> {
        let request = self.function_call(function, calldata)?;
        tracing::debug!(
            contract = %self.name,
            function,
            url = provider.url(),
            "contract call"
        );

        provider
            .call("starknet_call", vec![serde_json::to_value(&request)?, block.to_json()])
            .await
    }
}
