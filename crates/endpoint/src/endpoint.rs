use async_trait::async_trait;
use nft_deploy_types::NetworkIdentity;
use serde::{Deserialize, Serialize};

use crate::EndpointError;

/// Handle to a contract bound at a known address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractHandle {
    type_name: String,
    address: String,
}

impl ContractHandle {
    pub fn new(type_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            address: address.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

/// State-changing submission that has not been awaited yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTx {
    pub hash: String,
}

impl PendingTx {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }
}

/// Finalized submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: String,
    pub block_number: u64,
    /// Set for contract creations
    pub contract_address: Option<String>,
}

/// Remote execution endpoint
///
/// State-changing operations (`create`, `call`) return a `PendingTx` that
/// must be awaited with `wait_finalized` before their effects are visible.
#[async_trait]
pub trait ExecutionEndpoint: Send + Sync {
    /// Submit creation of a `type_name` contract
    async fn create(
        &self,
        type_name: &str,
        constructor_args: &[String],
    ) -> Result<PendingTx, EndpointError>;

    /// Block until `tx` is final
    async fn wait_finalized(&self, tx: &PendingTx) -> Result<Receipt, EndpointError>;

    /// Bind to an existing contract without changing state
    async fn attach(&self, type_name: &str, address: &str)
        -> Result<ContractHandle, EndpointError>;

    /// Submit a state-changing method call
    async fn call(
        &self,
        handle: &ContractHandle,
        method: &str,
        args: &[String],
    ) -> Result<PendingTx, EndpointError>;

    /// Read-only method call returning a string value
    async fn read(
        &self,
        handle: &ContractHandle,
        method: &str,
        args: &[String],
    ) -> Result<String, EndpointError>;

    async fn identity(&self) -> Result<NetworkIdentity, EndpointError>;
}
