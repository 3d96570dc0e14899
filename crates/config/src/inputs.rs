//! Lifecycle input loading
//!
//! Turns the mode-specific declarative input into an ordered, validated
//! `InstanceSpecs`. Every check runs before the orchestrator touches the
//! endpoint, so malformed input can never cause a partial deployment.

use indexmap::IndexMap;
use nft_deploy_types::{
    CollectionDefinition, Configuration, ExistingInstanceSpec, InstanceSpecs, LifecycleMode,
};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::validation::into_result;
use crate::{is_valid_address, ConfigError, InputConfig, Result, FieldError};

/// Serialization format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Toml,
    Yaml,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(InputFormat::Json),
            Some("toml") => Ok(InputFormat::Toml),
            Some("yaml") | Some("yml") => Ok(InputFormat::Yaml),
            other => Err(ConfigError::InputError {
                path: path.display().to_string(),
                reason: format!("unsupported file extension: {}", other.unwrap_or("<none>")),
            }),
        }
    }
}

/// Loads instance specifications for a lifecycle mode
#[derive(Debug, Clone)]
pub struct InputLoader {
    collections_path: PathBuf,
    instances_path: PathBuf,
}

impl InputLoader {
    pub fn new(collections_path: impl Into<PathBuf>, instances_path: impl Into<PathBuf>) -> Self {
        Self {
            collections_path: collections_path.into(),
            instances_path: instances_path.into(),
        }
    }

    pub fn from_config(config: &InputConfig) -> Self {
        Self::new(&config.collections_path, &config.instances_path)
    }

    /// Load the specs for `mode`
    ///
    /// Bootstrap ignores external input and returns the built-in fixture.
    pub fn load(&self, mode: LifecycleMode) -> Result<InstanceSpecs> {
        let specs = match mode {
            LifecycleMode::Bootstrap => {
                InstanceSpecs::Create(vec![CollectionDefinition::bootstrap_fixture()])
            }
            LifecycleMode::CreateConfigure => {
                let definitions = load_collections(&self.collections_path)?;
                validate_collections(&definitions, mode.plan().configuration)?;
                InstanceSpecs::Create(definitions)
            }
            LifecycleMode::ConfigureOnly => {
                let specs = load_instances(&self.instances_path)?;
                validate_instances(&specs)?;
                InstanceSpecs::Attach(specs)
            }
        };

        info!(mode = %mode, count = specs.len(), "Loaded instance specifications");
        Ok(specs)
    }
}

/// Read collection definitions keyed by collection id, in file order
pub fn load_collections(path: &Path) -> Result<Vec<CollectionDefinition>> {
    let entries: IndexMap<String, CollectionDefinition> = read_keyed(path)?;

    entries
        .into_iter()
        .map(|(key, mut definition)| {
            if definition.collection_id.is_empty() {
                definition.collection_id = key;
            } else if definition.collection_id != key {
                return Err(ConfigError::InputError {
                    path: path.display().to_string(),
                    reason: format!(
                        "entry '{key}' declares collection id '{}'",
                        definition.collection_id
                    ),
                });
            }
            Ok(definition)
        })
        .collect()
}

/// Read existing instance specs keyed by instance id, in file order
pub fn load_instances(path: &Path) -> Result<Vec<ExistingInstanceSpec>> {
    let entries: IndexMap<String, ExistingInstanceSpec> = read_keyed(path)?;

    entries
        .into_iter()
        .map(|(key, mut spec)| {
            if spec.instance_id.is_empty() {
                spec.instance_id = key;
            } else if spec.instance_id != key {
                return Err(ConfigError::InputError {
                    path: path.display().to_string(),
                    reason: format!("entry '{key}' declares instance id '{}'", spec.instance_id),
                });
            }
            Ok(spec)
        })
        .collect()
}

/// Parse a keyed input document from a string
pub fn parse_keyed<T: DeserializeOwned>(
    content: &str,
    format: InputFormat,
) -> Result<IndexMap<String, T>> {
    let entries = match format {
        InputFormat::Json => serde_json::from_str(content)?,
        InputFormat::Toml => toml::from_str(content)?,
        InputFormat::Yaml => serde_yaml::from_str(content)?,
    };
    Ok(entries)
}

fn read_keyed<T: DeserializeOwned>(path: &Path) -> Result<IndexMap<String, T>> {
    let format = InputFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::InputError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    debug!(path = %path.display(), ?format, "Reading input file");

    let entries: IndexMap<String, T> =
        parse_keyed(&content, format).map_err(|e| ConfigError::InputError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    if entries.is_empty() {
        return Err(ConfigError::InputError {
            path: path.display().to_string(),
            reason: "no entries".to_string(),
        });
    }

    Ok(entries)
}

/// Validate collection definitions for a create-capable mode
pub fn validate_collections(
    definitions: &[CollectionDefinition],
    configuration: Configuration,
) -> Result<()> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for definition in definitions {
        let id = &definition.collection_id;

        if id.trim().is_empty() {
            errors.push(FieldError::new(
                "collections",
                "collection id cannot be empty",
            ));
            continue;
        }

        if !seen.insert(id.as_str()) {
            errors.push(FieldError::new(
                format!("collections.{id}"),
                "duplicate collection id",
            ));
        }

        if definition.display_name.trim().is_empty() {
            errors.push(FieldError::new(
                format!("collections.{id}.display_name"),
                "display name is required",
            ));
        }

        if definition.symbol.trim().is_empty() {
            errors.push(FieldError::new(
                format!("collections.{id}.symbol"),
                "symbol is required",
            ));
        }

        if configuration == Configuration::Configure
            && definition.configuration_pointer.trim().is_empty()
        {
            errors.push(FieldError::new(
                format!("collections.{id}.configuration_pointer"),
                "configuration pointer is required",
            ));
        }
    }

    into_result(errors)
}

/// Validate existing instance specs for configure-only mode
pub fn validate_instances(specs: &[ExistingInstanceSpec]) -> Result<()> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for spec in specs {
        let id = &spec.instance_id;

        if id.trim().is_empty() {
            errors.push(FieldError::new(
                "instances",
                "instance id cannot be empty",
            ));
            continue;
        }

        if !seen.insert(id.as_str()) {
            errors.push(FieldError::new(
                format!("instances.{id}"),
                "duplicate instance id",
            ));
        }

        if spec.address.trim().is_empty() {
            errors.push(FieldError::new(
                format!("instances.{id}.address"),
                "address is required",
            ));
        } else if !is_valid_address(&spec.address) {
            errors.push(FieldError::new(
                format!("instances.{id}.address"),
                format!("'{}' is not a 0x-prefixed 20-byte hex address", spec.address),
            ));
        }

        if spec.configuration_pointer.trim().is_empty() {
            errors.push(FieldError::new(
                format!("instances.{id}.configuration_pointer"),
                "configuration pointer is required",
            ));
        }
    }

    into_result(errors)
}
