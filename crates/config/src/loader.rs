//! Layered loading of the application config

use crate::{AppConfig, ConfigError, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use std::path::Path;

/// Default prefix of environment overrides
pub const ENV_PREFIX: &str = "NFT_DEPLOY";

/// Separator between prefix, sections and keys in environment overrides
pub const ENV_SEPARATOR: &str = "__";

/// Config file format, from the file extension
fn file_format(path: &Path) -> Result<FileFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Ok(FileFormat::Toml),
        Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
        Some("json") => Ok(FileFormat::Json),
        Some(other) => Err(ConfigError::LoadError(format!(
            "unsupported config file extension '{other}' ({})",
            path.display()
        ))),
        None => Err(ConfigError::LoadError(format!(
            "config file has no extension: {}",
            path.display()
        ))),
    }
}

/// Entry points for reading `AppConfig` from files, strings and the environment
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read a single config file; TOML, YAML or JSON by extension
    pub fn from_file(path: &Path) -> Result<AppConfig> {
        let format = file_format(path)?;
        let content = std::fs::read_to_string(path)?;

        match format {
            FileFormat::Yaml => Self::from_yaml(&content),
            FileFormat::Json => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    pub fn from_toml(content: &str) -> Result<AppConfig> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> Result<AppConfig> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<AppConfig> {
        Ok(serde_json::from_str(content)?)
    }

    /// Defaults overridden by `{prefix}__SECTION__KEY` variables,
    /// e.g. `NFT_DEPLOY__RETRY__DELAY_SECS=5`
    pub fn from_env_with_prefix(prefix: &str) -> Result<AppConfig> {
        Self::builder().add_env(prefix).build()
    }

    /// Required config file with environment overrides applied key by key
    pub fn from_file_with_env(path: &Path, env_prefix: &str) -> Result<AppConfig> {
        if !path.exists() {
            return Err(ConfigError::LoadError(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        Self::builder().add_file(path, true)?.add_env(env_prefix).build()
    }

    /// Sources added later take precedence over earlier ones
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder {
            builder: Config::builder(),
        }
    }
}

/// Ordered stack of config sources
pub struct ConfigLoaderBuilder {
    builder: ConfigBuilder<config::builder::DefaultState>,
}

impl ConfigLoaderBuilder {
    /// Add a file layer; a missing optional file is skipped
    pub fn add_file(mut self, path: &Path, required: bool) -> Result<Self> {
        let format = file_format(path)?;
        self.builder = self
            .builder
            .add_source(File::from(path).format(format).required(required));
        Ok(self)
    }

    /// Add the `{prefix}__SECTION__KEY` environment layer
    pub fn add_env(mut self, prefix: &str) -> Self {
        self.builder = self.builder.add_source(
            Environment::with_prefix(prefix)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );
        self
    }

    /// Value that wins over every source (command line flags)
    pub fn set_override(mut self, key: &str, value: &str) -> Result<Self> {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<AppConfig> {
        Ok(self.builder.build()?.try_deserialize()?)
    }
}
