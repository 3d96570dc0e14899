use std::sync::Arc;
use std::time::Duration;

use nft_deploy_endpoint::ExecutionEndpoint;
use nft_deploy_retry::{RetryExecutor, RetryPolicy, Sleeper, TokioSleeper};
use nft_deploy_types::{InstanceSpecs, InstanceState, LifecycleMode, RunResult, DEFAULT_TYPE_NAME};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::instance::InstanceManager;
use crate::strategy::{plan_instances, InstancePlan, ProvisionStep};
use crate::{InstanceError, NoopRegistry, OrchestratorError, RegistryPublisher};

/// Configuration for the orchestrator
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// Contract type of every instance in the run
    pub type_name: String,

    /// Creation attempts per instance
    pub max_attempts: u32,

    /// Fixed delay between creation attempts
    pub retry_delay: Duration,
}

impl OrchestratorConfig {
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    pub fn with_retry(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.retry_delay = retry_delay;
        self
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            type_name: DEFAULT_TYPE_NAME.to_string(),
            max_attempts: policy.max_attempts(),
            retry_delay: policy.delay(),
        }
    }
}

/// Builder error
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("missing required field: {field}")]
    MissingField { field: String },
}

/// Builder for LifecycleOrchestrator
#[derive(Default)]
pub struct LifecycleOrchestratorBuilder {
    endpoint: Option<Arc<dyn ExecutionEndpoint>>,
    registry: Option<Arc<dyn RegistryPublisher>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    config: OrchestratorConfig,
}

impl LifecycleOrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: Arc<dyn ExecutionEndpoint>) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn RegistryPublisher>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the tokio timer used between retries
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<LifecycleOrchestrator, BuilderError> {
        let endpoint = self.endpoint.ok_or_else(|| BuilderError::MissingField {
            field: "endpoint".to_string(),
        })?;

        let policy = RetryPolicy::new(self.config.max_attempts, self.config.retry_delay);
        let sleeper = self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper));

        Ok(LifecycleOrchestrator {
            endpoint,
            registry: self.registry.unwrap_or_else(|| Arc::new(NoopRegistry)),
            retry: RetryExecutor::new(policy, sleeper),
            config: self.config,
        })
    }
}

/// Runs the lifecycle of every instance of a run in input order
pub struct LifecycleOrchestrator {
    endpoint: Arc<dyn ExecutionEndpoint>,
    registry: Arc<dyn RegistryPublisher>,
    retry: RetryExecutor<Arc<dyn Sleeper>>,
    config: OrchestratorConfig,
}

impl LifecycleOrchestrator {
    pub fn builder() -> LifecycleOrchestratorBuilder {
        LifecycleOrchestratorBuilder::new()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Process `specs` sequentially under `mode`
    ///
    /// Precondition failures are returned before any remote call. Instance
    /// failures are reported in the result: an exhausted creation is recorded
    /// and the run continues, any other failure stops the run and sets
    /// `aborted`.
    pub async fn run(
        &self,
        mode: LifecycleMode,
        specs: &InstanceSpecs,
    ) -> Result<RunResult, OrchestratorError> {
        let plans = plan_instances(mode, &self.config.type_name, specs)?;
        let mut result = RunResult::new(mode);

        info!(
            mode = %mode,
            type_name = %self.config.type_name,
            instances = plans.len(),
            "Starting lifecycle run"
        );

        for plan in &plans {
            let mut manager = InstanceManager::new(
                self.config.type_name.clone(),
                plan.instance_id.clone(),
                self.endpoint.as_ref(),
                &self.retry,
                self.registry.as_ref(),
            );

            let outcome = Self::drive(&mut manager, plan).await;
            result.records.push(manager.into_record());

            if let Err(e) = outcome {
                error!(
                    instance_id = %plan.instance_id,
                    postcondition = e.is_postcondition(),
                    error = %e,
                    "Fatal instance error, stopping run"
                );
                result.aborted = Some(format!("{}: {e}", plan.instance_id));
                break;
            }
        }

        let failed = result.failed().count();
        if result.is_aborted() {
            warn!(processed = result.records.len(), total = plans.len(), "Run aborted");
        } else {
            info!(
                processed = result.records.len(),
                failed,
                success = result.success(),
                "Lifecycle run finished"
            );
        }

        Ok(result)
    }

    async fn drive<S: Sleeper>(
        manager: &mut InstanceManager<'_, S>,
        plan: &InstancePlan,
    ) -> Result<(), InstanceError> {
        match &plan.provision {
            ProvisionStep::Create { constructor_args } => manager.create(constructor_args).await?,
            ProvisionStep::Attach { address } => manager.attach(address).await?,
        }

        if manager.state() == InstanceState::Failed {
            return Ok(());
        }

        match &plan.configuration {
            Some(pointer) => manager.configure(pointer).await,
            None => manager.skip_configure(),
        }
    }
}
