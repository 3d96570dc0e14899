//! Configuration validation

use crate::{AppConfig, ConfigError, Result};

/// One rejected field and the reason
#[derive(Debug, Clone)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Fold field errors into one `ConfigError::ValidationError`, `; ` separated
pub(crate) fn into_result(errors: Vec<FieldError>) -> Result<()> {
    match errors.as_slice() {
        [] => Ok(()),
        found => Err(ConfigError::ValidationError(
            found.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
        )),
    }
}

/// Check every section of `config`, reporting all problems together.
/// The mode is checked by `AppConfig::lifecycle_mode` instead, so the
/// `network` command works without one.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.network.name.trim().is_empty() {
        errors.push(FieldError::new(
            "network.name",
            "network name is required",
        ));
    }

    if let Err(e) = validate_url(&config.network.rpc_url) {
        errors.push(FieldError::new("network.rpc_url", e));
    }

    if config.network.request_timeout_ms == 0 {
        errors.push(FieldError::new(
            "network.request_timeout_ms",
            "must be greater than 0",
        ));
    }

    if let Some(from) = &config.endpoint.from_account {
        if !is_valid_address(from) {
            errors.push(FieldError::new(
                "endpoint.from_account",
                format!("'{from}' is not a 0x-prefixed 20-byte hex address"),
            ));
        }
    }

    if config.endpoint.poll_interval_ms == 0 {
        errors.push(FieldError::new(
            "endpoint.poll_interval_ms",
            "must be greater than 0",
        ));
    }

    if config.endpoint.finality_timeout_secs == 0 {
        errors.push(FieldError::new(
            "endpoint.finality_timeout_secs",
            "must be greater than 0",
        ));
    }

    if let Err(e) = validate_type_name(&config.contract.type_name) {
        errors.push(FieldError::new("contract.type_name", e));
    }

    if config.retry.max_attempts == 0 {
        errors.push(FieldError::new(
            "retry.max_attempts",
            "must be at least 1",
        ));
    }

    if config.output.dir.as_os_str().is_empty() {
        errors.push(FieldError::new(
            "output.dir",
            "output directory is required",
        ));
    }

    if config.registry.enabled {
        match config.registry.endpoint_url.as_deref() {
            None | Some("") => errors.push(FieldError::new(
                "registry.endpoint_url",
                "required when the registry is enabled",
            )),
            Some(url) => {
                if let Err(e) = validate_url(url) {
                    errors.push(FieldError::new("registry.endpoint_url", e));
                }
            }
        }
    }

    if let Err(e) = validate_log_level(&config.logging.level) {
        errors.push(e);
    }

    into_result(errors)
}

/// Accept only non-empty http(s) URLs
pub fn validate_url(url: &str) -> std::result::Result<(), String> {
    match url {
        "" => Err("url is required".to_string()),
        u if u.starts_with("http://") || u.starts_with("https://") => Ok(()),
        other => Err(format!("'{other}' is not an http:// or https:// url")),
    }
}

/// Whether `address` is a `0x`-prefixed 20-byte hex account or contract address
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
        Some(digits) => digits.len() == 40 && hex::decode(digits).is_ok(),
        None => false,
    }
}

/// Type names become artifact file names, so they are restricted to a safe
/// character set
fn validate_type_name(type_name: &str) -> std::result::Result<(), String> {
    if type_name.is_empty() {
        return Err("type name is required".to_string());
    }

    if !type_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(format!(
            "'{type_name}' may only contain ASCII letters, digits, '_' and '-'"
        ));
    }

    Ok(())
}

fn validate_log_level(level: &str) -> std::result::Result<(), FieldError> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(FieldError::new(
            "logging.level",
            format!("invalid log level '{level}' (expected trace, debug, info, warn or error)"),
        )),
    }
}
