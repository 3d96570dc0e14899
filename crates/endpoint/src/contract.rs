use serde::Deserialize;
use std::path::Path;

use crate::abi::decode_hex;
use crate::EndpointError;

/// Compiled contract type: interface metadata and creation bytecode
#[derive(Debug, Clone)]
pub struct CompiledContract {
    pub type_name: String,
    pub abi: serde_json::Value,
    pub bytecode: Vec<u8>,
}

/// Hardhat/Truffle artifact layout
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    contract_name: Option<String>,
    abi: serde_json::Value,
    #[serde(default)]
    bytecode: String,
}

impl CompiledContract {
    pub fn new(type_name: impl Into<String>, abi: serde_json::Value, bytecode: Vec<u8>) -> Self {
        Self {
            type_name: type_name.into(),
            abi,
            bytecode,
        }
    }

    /// Parse a compiled artifact; `type_name` wins over the embedded name
    pub fn from_json(type_name: &str, content: &str) -> Result<Self, EndpointError> {
        let file: ArtifactFile =
            serde_json::from_str(content).map_err(|e| EndpointError::Artifact(e.to_string()))?;

        if !file.abi.is_array() {
            return Err(EndpointError::Artifact("'abi' must be an array".to_string()));
        }

        if let Some(embedded) = file.contract_name.as_deref() {
            if embedded != type_name {
                tracing::warn!(
                    type_name,
                    embedded,
                    "Artifact contract name differs from configured type name"
                );
            }
        }

        let bytecode = decode_hex(&file.bytecode)
            .map_err(|e| EndpointError::Artifact(format!("bytecode: {e}")))?;

        Ok(Self::new(type_name, file.abi, bytecode))
    }

    pub fn from_file(type_name: &str, path: &Path) -> Result<Self, EndpointError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EndpointError::Artifact(format!("{}: {e}", path.display())))?;
        Self::from_json(type_name, &content)
    }

    /// Whether the artifact can be used to create new instances
    pub fn is_deployable(&self) -> bool {
        !self.bytecode.is_empty()
    }
}
