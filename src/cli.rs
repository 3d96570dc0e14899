use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default application config, used when present and `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "nft-deploy.toml";

/// NFT collection deployment orchestrator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Application config file (TOML, YAML or JSON)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Lifecycle mode: create-configure, bootstrap or configure-only
    #[arg(long)]
    pub mode: Option<String>,

    /// Run against an in-memory chain instead of the configured endpoint
    #[arg(long)]
    pub simulate: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Provision and configure the collection instances
    Run,
    /// Show the endpoint identity and its accounts
    Network,
}

impl Args {
    /// Config file to load and whether it must exist
    pub fn config_source(&self) -> (PathBuf, bool) {
        match &self.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        }
    }
}
