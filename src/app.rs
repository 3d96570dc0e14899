//! Wiring of configuration, endpoint and orchestrator for one invocation

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use nft_deploy_config::{
    validate_config, AppConfig, ConfigError, ConfigLoader, InputLoader, ENV_PREFIX,
};
use nft_deploy_endpoint::{
    CompiledContract, EndpointError, ExecutionEndpoint, JsonRpcConfig, JsonRpcEndpoint,
    SimulatedEndpoint,
};
use nft_deploy_orchestrator::{
    ArtifactWriter, HttpRegistry, LifecycleOrchestrator, NetworkIdentityReporter, NoopRegistry,
    OrchestratorConfig, RegistryPublisher,
};
use nft_deploy_retry::{Sleeper, TokioSleeper};
use nft_deploy_types::{AccountBalance, NetworkIdentity, RunResult};
use tracing::{error, info, warn};

use crate::cli::Args;

/// Load the application config with `--config` file, environment and
/// command line overrides, highest precedence last
pub fn load_config(args: &Args) -> Result<AppConfig, ConfigError> {
    let (path, required) = args.config_source();
    if required && !path.exists() {
        return Err(ConfigError::LoadError(format!(
            "config file not found: {}",
            path.display()
        )));
    }

    let mut builder = ConfigLoader::builder()
        .add_file(&path, required)?
        .add_env(ENV_PREFIX);

    if let Some(mode) = &args.mode {
        builder = builder.set_override("mode", mode)?;
    }
    if let Some(level) = &args.log_level {
        builder = builder.set_override("logging.level", level)?;
    }
    if args.json_logs {
        builder = builder.set_override("logging.json", "true")?;
    }

    builder.build()
}

/// Endpoint selected for this invocation
pub enum Backend {
    JsonRpc(Arc<JsonRpcEndpoint>),
    Simulated(Arc<SimulatedEndpoint>),
}

impl Backend {
    pub fn from_config(
        config: &AppConfig,
        simulate: bool,
        contract: Option<CompiledContract>,
    ) -> Result<Self, EndpointError> {
        if simulate {
            info!("Running against the simulated endpoint");
            return Ok(Backend::Simulated(Arc::new(SimulatedEndpoint::new())));
        }

        let mut endpoint = JsonRpcEndpoint::new(JsonRpcConfig {
            network_name: config.network.name.clone(),
            rpc_url: config.network.rpc_url.clone(),
            request_timeout: config.network.request_timeout(),
            from_account: config.endpoint.from_account.clone(),
            poll_interval: config.endpoint.poll_interval(),
            finality_timeout: config.endpoint.finality_timeout(),
        })?;

        if let Some(contract) = contract {
            endpoint = endpoint.with_contract(contract);
        }

        Ok(Backend::JsonRpc(Arc::new(endpoint)))
    }

    pub fn endpoint(&self) -> Arc<dyn ExecutionEndpoint> {
        match self {
            Backend::JsonRpc(endpoint) => endpoint.clone(),
            Backend::Simulated(endpoint) => endpoint.clone(),
        }
    }

    pub async fn accounts(&self) -> Result<Vec<AccountBalance>, EndpointError> {
        match self {
            Backend::JsonRpc(endpoint) => endpoint.accounts().await,
            Backend::Simulated(endpoint) => endpoint.accounts().await,
        }
    }
}

/// Compiled contract named by `contract.artifact_path`, if configured
pub fn load_contract(config: &AppConfig) -> Result<Option<CompiledContract>, EndpointError> {
    config
        .contract
        .artifact_path
        .as_deref()
        .map(|path| CompiledContract::from_file(&config.contract.type_name, path))
        .transpose()
}

pub fn registry_from_config(config: &AppConfig) -> Arc<dyn RegistryPublisher> {
    match (config.registry.enabled, &config.registry.endpoint_url) {
        (true, Some(url)) => Arc::new(HttpRegistry::new(
            url.clone(),
            config.registry.api_token.clone(),
        )),
        _ => Arc::new(NoopRegistry),
    }
}

/// Collaborators of a lifecycle run
pub struct RunContext {
    pub endpoint: Arc<dyn ExecutionEndpoint>,
    pub registry: Arc<dyn RegistryPublisher>,
    pub sleeper: Arc<dyn Sleeper>,
    /// Interface metadata published in the artifact
    pub interface_metadata: serde_json::Value,
}

impl RunContext {
    pub fn new(endpoint: Arc<dyn ExecutionEndpoint>) -> Self {
        Self {
            endpoint,
            registry: Arc::new(NoopRegistry),
            sleeper: Arc::new(TokioSleeper),
            interface_metadata: serde_json::Value::Array(Vec::new()),
        }
    }

    pub fn with_registry(mut self, registry: Arc<dyn RegistryPublisher>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_interface_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.interface_metadata = metadata;
        self
    }
}

/// Outcome of the `run` command
#[derive(Debug)]
pub struct RunReport {
    pub result: RunResult,
    pub network: Option<NetworkIdentity>,
    /// Written artifact; `None` when the run aborted or the write failed
    pub artifact: Option<PathBuf>,
    /// Reason the artifact could not be written
    pub artifact_error: Option<String>,
}

impl RunReport {
    /// Every instance succeeded and the artifact was written
    pub fn succeeded(&self) -> bool {
        self.result.success() && self.artifact.is_some()
    }

    /// Process exit status: 0 on success, 1 otherwise
    pub fn exit_status(&self) -> u8 {
        if self.succeeded() {
            0
        } else {
            1
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(network) = &self.network {
            lines.push(format!("network: {network}"));
        }
        lines.push(format!("mode: {}", self.result.mode));
        lines.extend(self.result.summary_lines());
        match (&self.artifact, &self.artifact_error) {
            (Some(path), _) => lines.push(format!("artifact: {}", path.display())),
            (None, Some(reason)) => lines.push(format!("artifact: write failed: {reason}")),
            (None, None) => lines.push("artifact: not written".to_string()),
        }
        lines
    }
}

/// Load inputs, run the lifecycle and write the artifact
///
/// Configuration and input problems are returned before the endpoint is
/// contacted. A failed artifact write is kept in the report so the
/// per-instance summary survives it.
pub async fn execute_run(config: &AppConfig, ctx: RunContext) -> anyhow::Result<RunReport> {
    let mode = config.lifecycle_mode()?;
    validate_config(config)?;

    let specs = InputLoader::from_config(&config.inputs)
        .load(mode)
        .context("failed to load instance inputs")?;

    let network = NetworkIdentityReporter::new(ctx.endpoint.clone())
        .report()
        .await;

    let orchestrator = LifecycleOrchestrator::builder()
        .with_endpoint(ctx.endpoint)
        .with_registry(ctx.registry)
        .with_sleeper(ctx.sleeper)
        .with_config(
            OrchestratorConfig::default()
                .with_type_name(config.contract.type_name.clone())
                .with_retry(config.retry.max_attempts, config.retry.delay()),
        )
        .build()?;

    let result = orchestrator.run(mode, &specs).await?;

    let (artifact, artifact_error) = if result.is_aborted() {
        warn!("Run aborted, no artifact written");
        (None, None)
    } else {
        let writer = ArtifactWriter::new(&config.output.dir);
        match writer.write(
            &config.contract.type_name,
            ctx.interface_metadata,
            &result.records,
            network.clone(),
        ) {
            Ok(path) => (Some(path), None),
            Err(e) => {
                let reason = format!("{:#}", anyhow::Error::new(e));
                error!(error = %reason, "Failed to write deployment artifact");
                (None, Some(reason))
            }
        }
    };

    Ok(RunReport {
        result,
        network,
        artifact,
        artifact_error,
    })
}

/// Identity and account listing for the `network` command
pub async fn describe_network(backend: &Backend) -> Vec<String> {
    let mut lines = Vec::new();

    match NetworkIdentityReporter::new(backend.endpoint()).report().await {
        Some(identity) => lines.push(format!("network: {identity}")),
        None => lines.push("network: unavailable".to_string()),
    }

    match backend.accounts().await {
        Ok(accounts) => {
            for account in accounts {
                lines.push(format!("{}: {} ETH", account.address, account.balance_ether()));
            }
        }
        Err(e) => warn!(error = %e, "Could not list accounts"),
    }

    lines
}
