//! Configuration management for the NFT collection deployment orchestrator
//!
//! This crate provides:
//! - Application config from TOML, YAML or JSON files
//! - Environment variable overrides (`NFT_DEPLOY__SECTION__KEY`)
//! - Config validation that reports every problem at once
//! - Loading of the mode-specific instance input files

mod config;
mod inputs;
mod loader;
mod validation;

pub use config::*;
pub use inputs::*;
pub use loader::*;
pub use validation::*;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("lifecycle mode not set (use --mode, NFT_DEPLOY__MODE or `mode` in the config file)")]
    MissingMode,

    #[error(transparent)]
    InvalidMode(#[from] nft_deploy_types::UnknownMode),

    #[error("cannot load config: {0}")]
    LoadError(String),

    #[error("invalid config: {0}")]
    ValidationError(String),

    #[error("invalid input file {path}: {reason}")]
    InputError { path: String, reason: String },

    #[error("config i/o: {0}")]
    IoError(#[from] std::io::Error),

    #[error("config source: {0}")]
    ConfigLibError(#[from] ::config::ConfigError),

    #[error("invalid TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
