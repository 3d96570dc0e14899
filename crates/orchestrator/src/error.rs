use nft_deploy_endpoint::EndpointError;
use nft_deploy_types::{LifecycleMode, RecordError};
use thiserror::Error;

/// Failure of one instance's lifecycle step
#[derive(Debug, Error)]
pub enum InstanceError {
    /// Configuration was applied but reads back a different value
    #[error("postcondition failed for {instance_id}: expected '{expected}', read '{actual}'")]
    Postcondition {
        instance_id: String,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    #[error("{instance_id} has no contract address")]
    MissingAddress { instance_id: String },

    #[error(transparent)]
    InvalidTransition(#[from] RecordError),
}

impl InstanceError {
    pub fn is_postcondition(&self) -> bool {
        matches!(self, InstanceError::Postcondition { .. })
    }
}

/// Run preconditions, checked before any remote call
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("mode {mode} expects {expected} specifications")]
    ModeMismatch {
        mode: LifecycleMode,
        expected: &'static str,
    },

    #[error("duplicate instance id {instance_id} for {type_name}")]
    DuplicateInstance {
        type_name: String,
        instance_id: String,
    },
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to write {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("registry rejected {address}: http {status}")]
    Rejected { address: String, status: u16 },
}
