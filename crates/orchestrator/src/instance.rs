//! Per-instance lifecycle state machine

use nft_deploy_endpoint::{ContractHandle, EndpointError, ExecutionEndpoint};
use nft_deploy_retry::{RetryExecutor, RetryOutcome, Sleeper};
use nft_deploy_types::{content_uri, InstanceRecord, InstanceState};
use tracing::{debug, info, warn};

use crate::{InstanceError, RegistryPublisher};

/// State-changing method applying the configuration pointer
pub const CONFIGURE_METHOD: &str = "setBaseURI";

/// Read-only method verifying the applied configuration
pub const VERIFY_METHOD: &str = "baseURI";

/// Drives one contract instance from `PENDING` to a terminal state
///
/// The manager owns the record and the contract handle. Every fatal error
/// leaves the record in `FAILED` before it is returned.
pub struct InstanceManager<'a, S: Sleeper> {
    endpoint: &'a dyn ExecutionEndpoint,
    retry: &'a RetryExecutor<S>,
    registry: &'a dyn RegistryPublisher,
    record: InstanceRecord,
    handle: Option<ContractHandle>,
}

impl<'a, S: Sleeper> InstanceManager<'a, S> {
    pub fn new(
        type_name: impl Into<String>,
        instance_id: impl Into<String>,
        endpoint: &'a dyn ExecutionEndpoint,
        retry: &'a RetryExecutor<S>,
        registry: &'a dyn RegistryPublisher,
    ) -> Self {
        Self {
            endpoint,
            retry,
            registry,
            record: InstanceRecord::new(type_name, instance_id),
            handle: None,
        }
    }

    pub fn record(&self) -> &InstanceRecord {
        &self.record
    }

    pub fn into_record(self) -> InstanceRecord {
        self.record
    }

    pub fn handle(&self) -> Option<&ContractHandle> {
        self.handle.as_ref()
    }

    pub fn state(&self) -> InstanceState {
        self.record.state()
    }

    /// Create a new contract instance under the retry policy
    ///
    /// Exhausting the retries marks the instance `FAILED` and returns `Ok`.
    pub async fn create(&mut self, constructor_args: &[String]) -> Result<(), InstanceError> {
        self.record.transition(InstanceState::Creating)?;

        let endpoint = self.endpoint;
        let type_name = self.record.type_name.clone();
        let type_name_ref = type_name.as_str();

        debug!(instance_id = %self.record.instance_id, type_name = %type_name, "Creating instance");

        let outcome = self
            .retry
            .execute(
                || async move {
                    let pending = endpoint.create(type_name_ref, constructor_args).await?;
                    endpoint.wait_finalized(&pending).await
                },
                EndpointError::is_transient,
            )
            .await;

        match outcome {
            Ok(RetryOutcome::Succeeded { value: receipt, attempts }) => {
                self.record.attempts = attempts;

                let Some(address) = receipt.contract_address else {
                    return self.fail(InstanceError::MissingAddress {
                        instance_id: self.record.instance_id.clone(),
                    });
                };

                if let Err(e) = self.record.set_address(address.clone()) {
                    return self.fail(e);
                }
                self.handle = Some(ContractHandle::new(type_name.clone(), address.clone()));
                self.record.transition(InstanceState::Created)?;

                info!(
                    instance_id = %self.record.instance_id,
                    address = %address,
                    attempts,
                    block = receipt.block_number,
                    "Instance created"
                );

                self.publish(&type_name, &address).await;
                Ok(())
            }
            Ok(RetryOutcome::Exhausted { attempts, last_error }) => {
                self.record.attempts = attempts;
                self.record.mark_failed(format!(
                    "endpoint unresponsive after {attempts} attempts: {last_error}"
                ))?;

                warn!(
                    instance_id = %self.record.instance_id,
                    attempts,
                    "Instance creation failed, continuing with remaining instances"
                );
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Bind to an existing contract instance; no retries
    pub async fn attach(&mut self, address: &str) -> Result<(), InstanceError> {
        self.record.transition(InstanceState::Attaching)?;

        if address.is_empty() {
            return self.fail(InstanceError::MissingAddress {
                instance_id: self.record.instance_id.clone(),
            });
        }

        let handle = match self.endpoint.attach(&self.record.type_name, address).await {
            Ok(handle) => handle,
            Err(e) => return self.fail(e),
        };

        if let Err(e) = self.record.set_address(address) {
            return self.fail(e);
        }
        self.handle = Some(handle);
        self.record.transition(InstanceState::Attached)?;

        info!(instance_id = %self.record.instance_id, address, "Instance attached");
        Ok(())
    }

    /// Apply the configuration pointer and verify it reads back
    pub async fn configure(&mut self, pointer: &str) -> Result<(), InstanceError> {
        self.record.transition(InstanceState::Configuring)?;

        let Some(handle) = self.handle.clone() else {
            return self.fail(InstanceError::MissingAddress {
                instance_id: self.record.instance_id.clone(),
            });
        };

        let actual = match self.apply(&handle, pointer).await {
            Ok(actual) => actual,
            Err(e) => return self.fail(e),
        };

        let expected = content_uri(pointer);
        if actual != expected {
            return self.fail(InstanceError::Postcondition {
                instance_id: self.record.instance_id.clone(),
                expected,
                actual,
            });
        }

        self.record.mark_configured(pointer)?;
        info!(
            instance_id = %self.record.instance_id,
            address = %handle.address(),
            base_uri = %expected,
            "Instance configured"
        );
        Ok(())
    }

    /// Finish without configuration
    pub fn skip_configure(&mut self) -> Result<(), InstanceError> {
        self.record.transition(InstanceState::Deployed)?;
        debug!(instance_id = %self.record.instance_id, "Configuration skipped");
        Ok(())
    }

    async fn apply(&self, handle: &ContractHandle, pointer: &str) -> Result<String, EndpointError> {
        let pending = self
            .endpoint
            .call(handle, CONFIGURE_METHOD, &[pointer.to_string()])
            .await?;
        self.endpoint.wait_finalized(&pending).await?;
        self.endpoint.read(handle, VERIFY_METHOD, &[]).await
    }

    async fn publish(&self, type_name: &str, address: &str) {
        if let Err(e) = self.registry.publish(type_name, address).await {
            warn!(
                instance_id = %self.record.instance_id,
                address,
                error = %e,
                "Registry publication failed"
            );
        }
    }

    fn fail<T>(&mut self, error: impl Into<InstanceError>) -> Result<T, InstanceError> {
        let error = error.into();
        self.record.mark_failed(error.to_string())?;
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEndpoint;
    use crate::{NoopRegistry, RegistryError};
    use async_trait::async_trait;
    use nft_deploy_retry::{RecordingSleeper, RetryPolicy};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn retry() -> (RetryExecutor<RecordingSleeper>, RecordingSleeper) {
        let sleeper = RecordingSleeper::new();
        (RetryExecutor::new(RetryPolicy::default(), sleeper.clone()), sleeper)
    }

    fn args() -> Vec<String> {
        vec!["NFT Collection TomAndJerry".to_string(), "COL-TNJ".to_string()]
    }

    #[derive(Default)]
    struct RecordingRegistry {
        published: Arc<Mutex<Vec<String>>>,
        should_fail: bool,
    }

    #[async_trait]
    impl RegistryPublisher for RecordingRegistry {
        async fn publish(&self, _type_name: &str, address: &str) -> Result<(), RegistryError> {
            self.published.lock().unwrap().push(address.to_string());
            if self.should_fail {
                return Err(RegistryError::Rejected {
                    address: address.to_string(),
                    status: 500,
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_create_then_configure() {
        let endpoint = MockEndpoint::new();
        let (retry, _) = retry();
        let registry = RecordingRegistry::default();
        let mut manager = InstanceManager::new("NFTMinter", "tom_and_jerry", &endpoint, &retry, &registry);

        manager.create(&args()).await.unwrap();
        assert_eq!(manager.state(), InstanceState::Created);
        assert_eq!(manager.record().attempts, 1);
        let address = manager.record().address().to_string();
        assert_eq!(manager.handle().unwrap().address(), address);
        assert_eq!(*registry.published.lock().unwrap(), vec![address]);

        manager.configure("QmCid").await.unwrap();
        assert_eq!(manager.state(), InstanceState::Configured);
        assert_eq!(manager.record().configured_pointer(), Some("QmCid"));
    }

    #[tokio::test]
    async fn test_empty_receipt_address_marks_failed() {
        let endpoint = MockEndpoint::with(|s| s.empty_contract_address = true);
        let (retry, _) = retry();
        let registry = RecordingRegistry::default();
        let mut manager = InstanceManager::new("NFTMinter", "a", &endpoint, &retry, &registry);

        let err = manager.create(&args()).await.unwrap_err();
        assert!(matches!(err, InstanceError::InvalidTransition(_)));
        assert_eq!(manager.state(), InstanceState::Failed);
        assert!(manager.record().failure().is_some());
        assert!(manager.handle().is_none());
        assert!(registry.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transient_failures_below_bound_recover() {
        let endpoint = MockEndpoint::with(|s| s.transient_creates = 3);
        let (retry, sleeper) = retry();
        let mut manager = InstanceManager::new("NFTMinter", "a", &endpoint, &retry, &NoopRegistry);

        manager.create(&args()).await.unwrap();
        assert_eq!(manager.state(), InstanceState::Created);
        assert_eq!(manager.record().attempts, 4);
        assert_eq!(sleeper.total_slept(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_exhausted_creation_fails_without_error() {
        let endpoint = MockEndpoint::with(|s| s.transient_creates = 6);
        let (retry, sleeper) = retry();
        let mut manager = InstanceManager::new("NFTMinter", "a", &endpoint, &retry, &NoopRegistry);

        manager.create(&args()).await.unwrap();
        assert_eq!(manager.state(), InstanceState::Failed);
        assert_eq!(manager.record().attempts, 6);
        assert!(manager.record().address().is_empty());
        assert!(manager.record().failure().unwrap().contains("6 attempts"));
        assert_eq!(endpoint.count("create"), 6);
        assert_eq!(sleeper.sleeps().len(), 5);
    }

    #[tokio::test]
    async fn test_fatal_creation_error_propagates() {
        let endpoint = MockEndpoint::with(|s| s.fatal_create = true);
        let (retry, sleeper) = retry();
        let mut manager = InstanceManager::new("NFTMinter", "a", &endpoint, &retry, &NoopRegistry);

        let err = manager.create(&args()).await.unwrap_err();
        assert!(matches!(err, InstanceError::Endpoint(_)));
        assert_eq!(manager.state(), InstanceState::Failed);
        assert_eq!(endpoint.count("create"), 1);
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_registry_failure_is_not_fatal() {
        let endpoint = MockEndpoint::new();
        let (retry, _) = retry();
        let registry = RecordingRegistry {
            should_fail: true,
            ..Default::default()
        };
        let mut manager = InstanceManager::new("NFTMinter", "a", &endpoint, &retry, &registry);

        manager.create(&args()).await.unwrap();
        assert_eq!(manager.state(), InstanceState::Created);
        assert_eq!(registry.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_attach_and_skip() {
        let endpoint = MockEndpoint::new();
        let (retry, _) = retry();
        let mut manager = InstanceManager::new("NFTMinter", "a", &endpoint, &retry, &NoopRegistry);

        manager
            .attach("0x5FbDB2315678afecb367f032d93F642f64180aa3")
            .await
            .unwrap();
        assert_eq!(manager.state(), InstanceState::Attached);
        assert_eq!(manager.record().attempts, 0);

        manager.skip_configure().unwrap();
        assert_eq!(manager.state(), InstanceState::Deployed);
        assert!(endpoint.count("call") == 0);
    }

    #[tokio::test]
    async fn test_attach_missing_address_makes_no_calls() {
        let endpoint = MockEndpoint::new();
        let (retry, _) = retry();
        let mut manager = InstanceManager::new("NFTMinter", "a", &endpoint, &retry, &NoopRegistry);

        let err = manager.attach("").await.unwrap_err();
        assert!(matches!(err, InstanceError::MissingAddress { .. }));
        assert_eq!(manager.state(), InstanceState::Failed);
        assert!(endpoint.calls().is_empty());
    }

    #[tokio::test]
    async fn test_attach_refused_is_fatal() {
        let endpoint = MockEndpoint::with(|s| s.refuse_attach = true);
        let (retry, _) = retry();
        let mut manager = InstanceManager::new("NFTMinter", "a", &endpoint, &retry, &NoopRegistry);

        assert!(manager.attach("0x01").await.is_err());
        assert_eq!(manager.state(), InstanceState::Failed);
        assert!(manager.record().address().is_empty());
    }

    #[tokio::test]
    async fn test_postcondition_mismatch() {
        let endpoint = MockEndpoint::with(|s| s.base_uri_override = Some("ipfs://other/".to_string()));
        let (retry, _) = retry();
        let mut manager = InstanceManager::new("NFTMinter", "a", &endpoint, &retry, &NoopRegistry);

        manager.attach("0x01").await.unwrap();
        let err = manager.configure("QmCid").await.unwrap_err();

        assert!(err.is_postcondition());
        match err {
            InstanceError::Postcondition { expected, actual, .. } => {
                assert_eq!(expected, "ipfs://QmCid/");
                assert_eq!(actual, "ipfs://other/");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(manager.state(), InstanceState::Failed);
        assert!(manager.record().configured_pointer().is_none());
    }

    #[tokio::test]
    async fn test_configure_requires_provisioned_instance() {
        let endpoint = MockEndpoint::new();
        let (retry, _) = retry();
        let mut manager = InstanceManager::new("NFTMinter", "a", &endpoint, &retry, &NoopRegistry);

        let err = manager.configure("QmCid").await.unwrap_err();
        assert!(matches!(err, InstanceError::InvalidTransition(_)));
        assert_eq!(manager.state(), InstanceState::Pending);
        assert!(endpoint.calls().is_empty());
    }

    #[tokio::test]
    async fn test_terminal_instance_rejects_further_steps() {
        let endpoint = MockEndpoint::new();
        let (retry, _) = retry();
        let mut manager = InstanceManager::new("NFTMinter", "a", &endpoint, &retry, &NoopRegistry);

        manager.attach("0x01").await.unwrap();
        manager.skip_configure().unwrap();
        assert!(manager.skip_configure().is_err());
        assert!(manager.configure("QmCid").await.is_err());
        assert_eq!(manager.state(), InstanceState::Deployed);
    }
}
