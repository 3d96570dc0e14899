//! Ethereum JSON-RPC execution endpoint
//!
//! Transactions are sent with `eth_sendTransaction` from an account the node
//! holds unlocked (a local development node, or a signing proxy in front of a
//! public network).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use nft_deploy_types::{AccountBalance, NetworkIdentity};
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::abi::{decode_hex, decode_string, encode_call, encode_hex, encode_strings, parse_quantity};
use crate::{CompiledContract, ContractHandle, EndpointError, ExecutionEndpoint, PendingTx, Receipt};

/// JSON-RPC endpoint settings
#[derive(Debug, Clone)]
pub struct JsonRpcConfig {
    pub network_name: String,
    pub rpc_url: String,
    pub request_timeout: Duration,
    /// Sender account; the node's first account when unset
    pub from_account: Option<String>,
    pub poll_interval: Duration,
    pub finality_timeout: Duration,
}

impl Default for JsonRpcConfig {
    fn default() -> Self {
        Self {
            network_name: "localhost".to_string(),
            rpc_url: "http://127.0.0.1:8545".to_string(),
            request_timeout: Duration::from_secs(30),
            from_account: None,
            poll_interval: Duration::from_millis(500),
            finality_timeout: Duration::from_secs(120),
        }
    }
}

pub struct JsonRpcEndpoint {
    config: JsonRpcConfig,
    client: reqwest::Client,
    contracts: HashMap<String, CompiledContract>,
    sender: OnceCell<String>,
    next_id: AtomicU64,
}

impl JsonRpcEndpoint {
    pub fn new(config: JsonRpcConfig) -> Result<Self, EndpointError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| EndpointError::Transport(format!("failed to build http client: {e}")))?;

        Ok(Self {
            config,
            client,
            contracts: HashMap::new(),
            sender: OnceCell::new(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Register a compiled contract type so it can be created
    pub fn with_contract(mut self, contract: CompiledContract) -> Self {
        self.contracts.insert(contract.type_name.clone(), contract);
        self
    }

    pub fn config(&self) -> &JsonRpcConfig {
        &self.config
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, EndpointError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = request_body(id, method, params);

        debug!(method, id, "JSON-RPC request");

        let response = self
            .client
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if matches!(status.as_u16(), 502..=504) {
            return Err(EndpointError::Transient(format!("{method}: http {status}")));
        }
        if !status.is_success() {
            return Err(EndpointError::Transport(format!("{method}: http {status}")));
        }

        let value: Value = response.json().await?;
        parse_response(value)
    }

    /// Sending account, resolved once
    async fn sender(&self) -> Result<&str, EndpointError> {
        let sender = self
            .sender
            .get_or_try_init(|| async {
                if let Some(from) = &self.config.from_account {
                    return Ok(from.clone());
                }
                self.account_addresses()
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        EndpointError::InvalidResponse("endpoint exposes no accounts".to_string())
                    })
            })
            .await?;
        Ok(sender.as_str())
    }

    async fn account_addresses(&self) -> Result<Vec<String>, EndpointError> {
        let value = self.request("eth_accounts", json!([])).await?;
        serde_json::from_value(value).map_err(|e| EndpointError::InvalidResponse(e.to_string()))
    }

    pub async fn chain_id(&self) -> Result<u64, EndpointError> {
        let value = self.request("eth_chainId", json!([])).await?;
        let raw = as_str(&value, "eth_chainId")?;
        u64::try_from(parse_quantity(raw)?)
            .map_err(|_| EndpointError::InvalidResponse(format!("chain id {raw} out of range")))
    }

    /// Accounts held by the endpoint together with their balances
    pub async fn accounts(&self) -> Result<Vec<AccountBalance>, EndpointError> {
        let mut balances = Vec::new();
        for address in self.account_addresses().await? {
            let value = self
                .request("eth_getBalance", json!([address, "latest"]))
                .await?;
            let balance_wei = parse_quantity(as_str(&value, "eth_getBalance")?)?;
            balances.push(AccountBalance {
                address,
                balance_wei,
            });
        }
        Ok(balances)
    }

    async fn send_transaction(&self, to: Option<&str>, data: Vec<u8>) -> Result<PendingTx, EndpointError> {
        let from = self.sender().await?.to_string();
        let mut tx = json!({
            "from": from,
            "data": encode_hex(&data),
        });
        if let Some(to) = to {
            tx["to"] = json!(to);
        }

        let value = self.request("eth_sendTransaction", json!([tx])).await?;
        Ok(PendingTx::new(as_str(&value, "eth_sendTransaction")?))
    }
}

#[async_trait]
impl ExecutionEndpoint for JsonRpcEndpoint {
    async fn create(&self, type_name: &str, constructor_args: &[String]) -> Result<PendingTx, EndpointError> {
        let contract = self
            .contracts
            .get(type_name)
            .ok_or_else(|| EndpointError::UnknownContract(type_name.to_string()))?;

        if !contract.is_deployable() {
            return Err(EndpointError::Artifact(format!(
                "{type_name} artifact has no creation bytecode"
            )));
        }

        let mut data = contract.bytecode.clone();
        data.extend_from_slice(&encode_strings(constructor_args));

        let pending = self.send_transaction(None, data).await?;
        info!(type_name, tx_hash = %pending.hash, "Creation submitted");
        Ok(pending)
    }

    async fn wait_finalized(&self, tx: &PendingTx) -> Result<Receipt, EndpointError> {
        let deadline = Instant::now() + self.config.finality_timeout;

        loop {
            let value = self
                .request("eth_getTransactionReceipt", json!([tx.hash]))
                .await?;

            if !value.is_null() {
                return parse_receipt(&tx.hash, &value);
            }

            if Instant::now() >= deadline {
                return Err(EndpointError::Transient(format!(
                    "transaction {} not final after {:?}",
                    tx.hash, self.config.finality_timeout
                )));
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn attach(&self, type_name: &str, address: &str) -> Result<ContractHandle, EndpointError> {
        let value = self.request("eth_getCode", json!([address, "latest"])).await?;
        let code = decode_hex(as_str(&value, "eth_getCode")?)?;

        if code.is_empty() {
            return Err(EndpointError::NoContract {
                type_name: type_name.to_string(),
                address: address.to_string(),
            });
        }

        Ok(ContractHandle::new(type_name, address))
    }

    async fn call(&self, handle: &ContractHandle, method: &str, args: &[String]) -> Result<PendingTx, EndpointError> {
        let pending = self
            .send_transaction(Some(handle.address()), encode_call(method, args))
            .await?;
        debug!(address = handle.address(), method, tx_hash = %pending.hash, "Call submitted");
        Ok(pending)
    }

    async fn read(&self, handle: &ContractHandle, method: &str, args: &[String]) -> Result<String, EndpointError> {
        let call = json!({
            "to": handle.address(),
            "data": encode_hex(&encode_call(method, args)),
        });
        let value = self.request("eth_call", json!([call, "latest"])).await?;
        decode_string(&decode_hex(as_str(&value, "eth_call")?)?)
    }

    async fn identity(&self) -> Result<NetworkIdentity, EndpointError> {
        Ok(NetworkIdentity {
            name: self.config.network_name.clone(),
            endpoint_url: self.config.rpc_url.clone(),
            chain_id: self.chain_id().await?,
        })
    }
}

fn request_body(id: u64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
}

fn parse_response(mut value: Value) -> Result<Value, EndpointError> {
    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        return Err(EndpointError::Rpc {
            code: error["code"].as_i64().unwrap_or_default(),
            message: error["message"].as_str().unwrap_or("unknown error").to_string(),
        });
    }

    match value.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(EndpointError::InvalidResponse(
            "response carries neither result nor error".to_string(),
        )),
    }
}

fn parse_receipt(tx_hash: &str, value: &Value) -> Result<Receipt, EndpointError> {
    if value["status"].as_str() == Some("0x0") {
        return Err(EndpointError::Reverted {
            tx_hash: tx_hash.to_string(),
        });
    }

    let block_number = u64::try_from(parse_quantity(as_str(&value["blockNumber"], "blockNumber")?)?)
        .map_err(|_| EndpointError::InvalidResponse("block number out of range".to_string()))?;

    Ok(Receipt {
        tx_hash: tx_hash.to_string(),
        block_number,
        contract_address: value["contractAddress"].as_str().map(str::to_string),
    })
}

fn as_str<'a>(value: &'a Value, what: &str) -> Result<&'a str, EndpointError> {
    value
        .as_str()
        .ok_or_else(|| EndpointError::InvalidResponse(format!("{what}: expected a string, got {value}")))
}
