//! Execution endpoint for contract creation, calls and reads
//!
//! - `ExecutionEndpoint`: the collaborator contract the orchestrator drives
//! - `JsonRpcEndpoint`: Ethereum JSON-RPC node with unlocked sender accounts
//! - `SimulatedEndpoint`: deterministic in-memory chain for dry runs and tests

pub mod abi;
pub mod contract;
pub mod endpoint;
pub mod error;
pub mod jsonrpc;
pub mod simulated;

pub use contract::CompiledContract;
pub use endpoint::{ContractHandle, ExecutionEndpoint, PendingTx, Receipt};
pub use error::EndpointError;
pub use jsonrpc::{JsonRpcConfig, JsonRpcEndpoint};
pub use simulated::SimulatedEndpoint;
