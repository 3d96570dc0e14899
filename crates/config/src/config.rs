//! Core configuration structures for the deployment orchestrator

use nft_deploy_types::{LifecycleMode, DEFAULT_TYPE_NAME};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::{ConfigError, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Lifecycle mode: create-configure, bootstrap or configure-only
    #[serde(default)]
    pub mode: Option<String>,

    /// Execution endpoint the run talks to
    #[serde(default)]
    pub network: NetworkConfig,

    /// Transaction submission and finality settings
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Contract type provisioned by the run
    #[serde(default)]
    pub contract: ContractConfig,

    /// Declarative instance input files
    #[serde(default)]
    pub inputs: InputConfig,

    /// Creation retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Artifact output
    #[serde(default)]
    pub output: OutputConfig,

    /// Explorer registry publication
    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validated lifecycle mode; an absent or unrecognized value is an error
    pub fn lifecycle_mode(&self) -> Result<LifecycleMode> {
        let raw = self.mode.as_deref().ok_or(ConfigError::MissingMode)?;
        if raw.trim().is_empty() {
            return Err(ConfigError::MissingMode);
        }
        Ok(raw.parse::<LifecycleMode>()?)
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }
}

/// Execution endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Name reported in diagnostics (e.g. "localhost", "sepolia")
    #[serde(default = "default_network_name")]
    pub name: String,

    /// JSON-RPC endpoint URL
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl NetworkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Transaction submission settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Sender account; the first unlocked endpoint account when unset
    #[serde(default)]
    pub from_account: Option<String>,

    /// Receipt polling interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on waiting for finality, in seconds
    #[serde(default = "default_finality_timeout_secs")]
    pub finality_timeout_secs: u64,
}

impl EndpointConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn finality_timeout(&self) -> Duration {
        Duration::from_secs(self.finality_timeout_secs)
    }
}

/// Contract type configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Contract type name; also names the artifact file
    #[serde(default = "default_type_name")]
    pub type_name: String,

    /// Compiled contract JSON carrying `abi` and `bytecode`
    #[serde(default)]
    pub artifact_path: Option<PathBuf>,
}

/// Mode-specific input files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Collection definitions for create-configure mode
    #[serde(default = "default_collections_path")]
    pub collections_path: PathBuf,

    /// Existing instances for configure-only mode
    #[serde(default = "default_instances_path")]
    pub instances_path: PathBuf,
}

/// Creation retry policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts, in seconds
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Artifact output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving one `{type_name}.json` per contract type
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

/// Explorer registry publication
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub endpoint_url: Option<String>,

    #[serde(default)]
    pub api_token: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human readable output
    #[serde(default)]
    pub json: bool,
}

// Default value functions
fn default_network_name() -> String {
    "localhost".to_string()
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30000
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_finality_timeout_secs() -> u64 {
    120
}

fn default_type_name() -> String {
    DEFAULT_TYPE_NAME.to_string()
}

fn default_collections_path() -> PathBuf {
    PathBuf::from("collections.json")
}

fn default_instances_path() -> PathBuf {
    PathBuf::from("setup_e2e_input.json")
}

fn default_max_attempts() -> u32 {
    6
}

fn default_delay_secs() -> u64 {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dapp_contracts_info")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: default_network_name(),
            rpc_url: default_rpc_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            from_account: None,
            poll_interval_ms: default_poll_interval_ms(),
            finality_timeout_secs: default_finality_timeout_secs(),
        }
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            type_name: default_type_name(),
            artifact_path: None,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            collections_path: default_collections_path(),
            instances_path: default_instances_path(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_secs: default_delay_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
