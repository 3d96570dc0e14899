//! In-memory execution endpoint
//!
//! Behaves like a single-node chain that finalizes a block per awaited
//! transaction. Effects of `create` and `call` only become visible after
//! `wait_finalized`. Failures can be injected per collection name or for
//! the next N requests.

use std::collections::HashMap;

use async_trait::async_trait;
use nft_deploy_types::{content_uri, AccountBalance, NetworkIdentity};
use tokio::sync::Mutex;
use tracing::debug;

use crate::abi::{encode_hex, keccak256};
use crate::{ContractHandle, EndpointError, ExecutionEndpoint, PendingTx, Receipt};

const SET_BASE_URI: &str = "setBaseURI";
const BASE_URI: &str = "baseURI";

/// Balance reported for the simulated sender account
const SENDER_BALANCE_WEI: u128 = 10_000 * 1_000_000_000_000_000_000;

#[derive(Debug, Clone)]
struct SimContract {
    type_name: String,
    name: String,
    symbol: String,
    base_uri: String,
}

#[derive(Debug)]
enum Effect {
    Create {
        type_name: String,
        args: Vec<String>,
    },
    SetBaseUri {
        address: String,
        value: String,
    },
}

#[derive(Debug, Default)]
struct ChainState {
    block_number: u64,
    nonce: u64,
    contracts: HashMap<String, SimContract>,
    pending: HashMap<String, Effect>,
    /// Remaining transient failures keyed by collection name
    failing_creations: HashMap<String, u32>,
    rejected_creations: Vec<String>,
    /// Transient failures applied to the next requests of any kind
    unavailable_for: u32,
    corrupt_configuration: bool,
    requests: u64,
}

impl ChainState {
    fn begin_request(&mut self, op: &str) -> Result<(), EndpointError> {
        self.requests += 1;
        if self.unavailable_for > 0 {
            self.unavailable_for -= 1;
            return Err(EndpointError::Transient(format!("{op}: headers timeout")));
        }
        Ok(())
    }

    fn next_hash(&mut self, tag: &str) -> String {
        self.nonce += 1;
        encode_hex(&keccak256(format!("{tag}:{}", self.nonce).as_bytes()))
    }

    fn next_address(&mut self) -> String {
        self.nonce += 1;
        let hash = keccak256(format!("contract:{}", self.nonce).as_bytes());
        encode_hex(&hash[12..])
    }

    fn contract(&self, address: &str) -> Option<&SimContract> {
        self.contracts.get(&address.to_lowercase())
    }
}

pub struct SimulatedEndpoint {
    identity: NetworkIdentity,
    sender: String,
    state: Mutex<ChainState>,
}

impl Default for SimulatedEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedEndpoint {
    pub fn new() -> Self {
        Self {
            identity: NetworkIdentity {
                name: "simulated".to_string(),
                endpoint_url: "memory://simulated".to_string(),
                chain_id: 31337,
            },
            sender: encode_hex(&keccak256(b"simulated-sender")[12..]),
            state: Mutex::new(ChainState::default()),
        }
    }

    pub fn with_identity(mut self, identity: NetworkIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Creations of collection `name` fail transiently `times` times
    pub fn with_failing_creation(mut self, name: impl Into<String>, times: u32) -> Self {
        self.state.get_mut().failing_creations.insert(name.into(), times);
        self
    }

    /// Creations of collection `name` are rejected by the chain
    pub fn with_rejected_creation(mut self, name: impl Into<String>) -> Self {
        self.state.get_mut().rejected_creations.push(name.into());
        self
    }

    /// The next `requests` requests of any kind fail transiently
    pub fn with_unavailable_requests(mut self, requests: u32) -> Self {
        self.state.get_mut().unavailable_for = requests;
        self
    }

    /// `setBaseURI` stores the raw pointer instead of the content URI
    pub fn with_corrupted_configuration(mut self) -> Self {
        self.state.get_mut().corrupt_configuration = true;
        self
    }

    /// Place an already finalized contract on the chain, returning its address
    pub async fn deploy_existing(&self, type_name: &str, name: &str, symbol: &str) -> String {
        let mut state = self.state.lock().await;
        let address = state.next_address();
        state.block_number += 1;
        state.contracts.insert(
            address.clone(),
            SimContract {
                type_name: type_name.to_string(),
                name: name.to_string(),
                symbol: symbol.to_string(),
                base_uri: String::new(),
            },
        );
        address
    }

    /// Number of requests served, failed ones included
    pub async fn request_count(&self) -> u64 {
        self.state.lock().await.requests
    }

    pub async fn contract_count(&self) -> usize {
        self.state.lock().await.contracts.len()
    }

    /// Stored base URI of the contract at `address`
    pub async fn base_uri_of(&self, address: &str) -> Option<String> {
        let state = self.state.lock().await;
        state.contract(address).map(|c| c.base_uri.clone())
    }

    pub async fn accounts(&self) -> Result<Vec<AccountBalance>, EndpointError> {
        self.state.lock().await.begin_request("accounts")?;
        Ok(vec![AccountBalance {
            address: self.sender.clone(),
            balance_wei: SENDER_BALANCE_WEI,
        }])
    }
}

#[async_trait]
impl ExecutionEndpoint for SimulatedEndpoint {
    async fn create(&self, type_name: &str, constructor_args: &[String]) -> Result<PendingTx, EndpointError> {
        let mut state = self.state.lock().await;
        state.begin_request("create")?;

        let name = constructor_args.first().cloned().unwrap_or_default();

        if let Some(remaining) = state.failing_creations.get_mut(&name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(EndpointError::Transient(format!(
                    "create {name}: headers timeout"
                )));
            }
        }

        if state.rejected_creations.contains(&name) {
            return Err(EndpointError::Rpc {
                code: -32000,
                message: format!("execution reverted: {name} rejected"),
            });
        }

        let hash = state.next_hash("create");
        state.pending.insert(
            hash.clone(),
            Effect::Create {
                type_name: type_name.to_string(),
                args: constructor_args.to_vec(),
            },
        );

        debug!(type_name, tx_hash = %hash, "Simulated creation submitted");
        Ok(PendingTx::new(hash))
    }

    async fn wait_finalized(&self, tx: &PendingTx) -> Result<Receipt, EndpointError> {
        let mut state = self.state.lock().await;
        state.begin_request("wait_finalized")?;

        let effect = state.pending.remove(&tx.hash).ok_or_else(|| {
            EndpointError::InvalidResponse(format!("unknown transaction {}", tx.hash))
        })?;

        state.block_number += 1;
        let block_number = state.block_number;

        let contract_address = match effect {
            Effect::Create { type_name, args } => {
                let address = state.next_address();
                state.contracts.insert(
                    address.clone(),
                    SimContract {
                        type_name,
                        name: args.first().cloned().unwrap_or_default(),
                        symbol: args.get(1).cloned().unwrap_or_default(),
                        base_uri: String::new(),
                    },
                );
                Some(address)
            }
            Effect::SetBaseUri { address, value } => {
                if let Some(contract) = state.contracts.get_mut(&address) {
                    contract.base_uri = value;
                }
                None
            }
        };

        Ok(Receipt {
            tx_hash: tx.hash.clone(),
            block_number,
            contract_address,
        })
    }

    async fn attach(&self, type_name: &str, address: &str) -> Result<ContractHandle, EndpointError> {
        let mut state = self.state.lock().await;
        state.begin_request("attach")?;

        match state.contract(address) {
            Some(contract) if contract.type_name == type_name => {
                Ok(ContractHandle::new(type_name, address))
            }
            _ => Err(EndpointError::NoContract {
                type_name: type_name.to_string(),
                address: address.to_string(),
            }),
        }
    }

    async fn call(&self, handle: &ContractHandle, method: &str, args: &[String]) -> Result<PendingTx, EndpointError> {
        let mut state = self.state.lock().await;
        state.begin_request("call")?;

        if state.contract(handle.address()).is_none() {
            return Err(EndpointError::NoContract {
                type_name: handle.type_name().to_string(),
                address: handle.address().to_string(),
            });
        }

        let effect = match (method, args) {
            (SET_BASE_URI, [pointer]) => Effect::SetBaseUri {
                address: handle.address().to_lowercase(),
                value: if state.corrupt_configuration {
                    pointer.clone()
                } else {
                    content_uri(pointer)
                },
            },
            _ => return Err(EndpointError::UnsupportedMethod(method.to_string())),
        };

        let hash = state.next_hash("call");
        state.pending.insert(hash.clone(), effect);
        Ok(PendingTx::new(hash))
    }

    async fn read(&self, handle: &ContractHandle, method: &str, args: &[String]) -> Result<String, EndpointError> {
        let mut state = self.state.lock().await;
        state.begin_request("read")?;

        let contract = state
            .contract(handle.address())
            .ok_or_else(|| EndpointError::NoContract {
                type_name: handle.type_name().to_string(),
                address: handle.address().to_string(),
            })?;

        if !args.is_empty() {
            return Err(EndpointError::UnsupportedMethod(method.to_string()));
        }

        match method {
            BASE_URI => Ok(contract.base_uri.clone()),
            "name" => Ok(contract.name.clone()),
            "symbol" => Ok(contract.symbol.clone()),
            _ => Err(EndpointError::UnsupportedMethod(method.to_string())),
        }
    }

    async fn identity(&self) -> Result<NetworkIdentity, EndpointError> {
        self.state.lock().await.begin_request("identity")?;
        Ok(self.identity.clone())
    }
}
