use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{InstanceRecord, NetworkIdentity};

/// Published `{name, address}` pair of a successful instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactInstance {
    pub name: String,
    pub address: String,
}

/// Instance that did not reach a successful terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedInstance {
    pub name: String,
    pub reason: String,
}

/// Per-type deployment record consumed by the client application
///
/// Key names follow what the client reads: `contractName`,
/// `contractInstances` and `abi`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentArtifact {
    #[serde(rename = "contractName")]
    pub type_name: String,

    #[serde(rename = "contractInstances")]
    pub instances: Vec<ArtifactInstance>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_instances: Vec<FailedInstance>,

    /// Interface metadata of the contract type
    #[serde(rename = "abi")]
    pub interface_metadata: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkIdentity>,

    pub generated_at: DateTime<Utc>,
}

impl DeploymentArtifact {
    /// Build the artifact for `type_name` from the records of a run
    ///
    /// Successful instances are published verbatim; failed ones are listed
    /// separately. Records of other types and non-terminal records are ignored.
    pub fn from_records<'a>(
        type_name: &str,
        interface_metadata: serde_json::Value,
        records: impl IntoIterator<Item = &'a InstanceRecord>,
        network: Option<NetworkIdentity>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut instances = Vec::new();
        let mut failed_instances = Vec::new();

        for record in records.into_iter().filter(|r| r.type_name == type_name) {
            if record.state().is_success() {
                instances.push(ArtifactInstance {
                    name: record.instance_id.clone(),
                    address: record.address().to_string(),
                });
            } else if record.state().is_terminal() {
                failed_instances.push(FailedInstance {
                    name: record.instance_id.clone(),
                    reason: record.failure().unwrap_or("unknown").to_string(),
                });
            }
        }

        Self {
            type_name: type_name.to_string(),
            instances,
            failed_instances,
            interface_metadata,
            network,
            generated_at,
        }
    }
}
