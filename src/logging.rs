use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to initialize tracing: {0}")]
    InitError(String),
}

/// Filter used when `RUST_LOG` is unset
///
/// At the default `info` level the workspace crates log at `debug`.
pub fn default_filter(level: &str) -> String {
    match level.to_lowercase().as_str() {
        "info" => "info,nft_deploy=debug".to_string(),
        other => other.to_string(),
    }
}

/// Initialize tracing; `RUST_LOG` takes precedence over `level`
pub fn init_tracing(level: &str, json: bool) -> Result<(), LoggingError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if json {
        registry
            .with(fmt::layer().with_target(true).json())
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| LoggingError::InitError(e.to_string()))
}
