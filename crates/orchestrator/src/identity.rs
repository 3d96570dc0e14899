use std::sync::Arc;

use nft_deploy_endpoint::ExecutionEndpoint;
use nft_deploy_types::NetworkIdentity;
use tracing::{info, warn};

/// Diagnostic report of the endpoint a run talks to
pub struct NetworkIdentityReporter {
    endpoint: Arc<dyn ExecutionEndpoint>,
}

impl NetworkIdentityReporter {
    pub fn new(endpoint: Arc<dyn ExecutionEndpoint>) -> Self {
        Self { endpoint }
    }

    /// A failed read only suppresses the diagnostic
    pub async fn report(&self) -> Option<NetworkIdentity> {
        match self.endpoint.identity().await {
            Ok(identity) => {
                info!(
                    network = %identity.name,
                    chain_id = identity.chain_id,
                    endpoint = %identity.endpoint_url,
                    "Connected to network"
                );
                Some(identity)
            }
            Err(e) => {
                warn!(error = %e, "Could not determine network identity");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEndpoint;

    #[tokio::test]
    async fn test_report_identity() {
        let reporter = NetworkIdentityReporter::new(Arc::new(MockEndpoint::new()));
        let identity = reporter.report().await.unwrap();
        assert_eq!(identity.chain_id, 31337);
        assert_eq!(identity.name, "hardhat");
    }

    #[tokio::test]
    async fn test_unavailable_identity_is_suppressed() {
        let endpoint = MockEndpoint::with(|s| s.identity_unavailable = true);
        let reporter = NetworkIdentityReporter::new(Arc::new(endpoint.clone()));
        assert!(reporter.report().await.is_none());
        assert_eq!(endpoint.count("identity"), 1);
    }
}
