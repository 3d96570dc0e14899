//! Scriptable endpoint for unit tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nft_deploy_endpoint::{ContractHandle, EndpointError, ExecutionEndpoint, PendingTx, Receipt};
use nft_deploy_types::{content_uri, NetworkIdentity};

#[derive(Default)]
pub struct MockState {
    /// Transient failures left before `create` succeeds
    pub transient_creates: u32,
    pub fatal_create: bool,
    pub refuse_attach: bool,
    /// Creation receipts carry `Some("")` as the contract address
    pub empty_contract_address: bool,
    /// Value returned by `baseURI()` regardless of what was set
    pub base_uri_override: Option<String>,
    pub identity_unavailable: bool,
    pub calls: Vec<String>,
    pub base_uris: HashMap<String, String>,
    pending_uri: HashMap<String, (String, String)>,
    created: u32,
}

#[derive(Clone, Default)]
pub struct MockEndpoint {
    pub state: Arc<Mutex<MockState>>,
}

impl MockEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(f: impl FnOnce(&mut MockState)) -> Self {
        let mock = Self::new();
        f(&mut mock.state.lock().unwrap());
        mock
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == op).count()
    }
}

#[async_trait]
impl ExecutionEndpoint for MockEndpoint {
    async fn create(&self, _type_name: &str, _args: &[String]) -> Result<PendingTx, EndpointError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("create".to_string());
        if state.fatal_create {
            return Err(EndpointError::Rpc {
                code: -32000,
                message: "insufficient funds".to_string(),
            });
        }
        if state.transient_creates > 0 {
            state.transient_creates -= 1;
            return Err(EndpointError::Transient("headers timeout".to_string()));
        }
        state.created += 1;
        Ok(PendingTx::new(format!("create-{}", state.created)))
    }

    async fn wait_finalized(&self, tx: &PendingTx) -> Result<Receipt, EndpointError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("wait_finalized".to_string());

        let contract_address = match tx.hash.strip_prefix("create-") {
            Some(_) if state.empty_contract_address => Some(String::new()),
            Some(n) => Some(format!("0x{:0>40}", n)),
            None => {
                if let Some((address, value)) = state.pending_uri.remove(&tx.hash) {
                    state.base_uris.insert(address, value);
                }
                None
            }
        };

        Ok(Receipt {
            tx_hash: tx.hash.clone(),
            block_number: 1,
            contract_address,
        })
    }

    async fn attach(&self, type_name: &str, address: &str) -> Result<ContractHandle, EndpointError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("attach".to_string());
        if state.refuse_attach {
            return Err(EndpointError::NoContract {
                type_name: type_name.to_string(),
                address: address.to_string(),
            });
        }
        Ok(ContractHandle::new(type_name, address))
    }

    async fn call(&self, handle: &ContractHandle, method: &str, args: &[String]) -> Result<PendingTx, EndpointError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("call".to_string());
        if method != "setBaseURI" || args.len() != 1 {
            return Err(EndpointError::UnsupportedMethod(method.to_string()));
        }
        let hash = format!("call-{}", state.calls.len());
        state
            .pending_uri
            .insert(hash.clone(), (handle.address().to_string(), content_uri(&args[0])));
        Ok(PendingTx::new(hash))
    }

    async fn read(&self, handle: &ContractHandle, method: &str, _args: &[String]) -> Result<String, EndpointError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("read".to_string());
        if method != "baseURI" {
            return Err(EndpointError::UnsupportedMethod(method.to_string()));
        }
        if let Some(value) = &state.base_uri_override {
            return Ok(value.clone());
        }
        Ok(state.base_uris.get(handle.address()).cloned().unwrap_or_default())
    }

    async fn identity(&self) -> Result<NetworkIdentity, EndpointError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("identity".to_string());
        if state.identity_unavailable {
            return Err(EndpointError::Transient("connection refused".to_string()));
        }
        Ok(NetworkIdentity {
            name: "hardhat".to_string(),
            endpoint_url: "http://127.0.0.1:8545".to_string(),
            chain_id: 31337,
        })
    }
}
