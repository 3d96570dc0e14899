//! Command line front end of the NFT collection deployment orchestrator

pub mod app;
pub mod cli;
pub mod logging;

pub use app::{execute_run, load_config, Backend, RunContext, RunReport};
pub use cli::{Args, Command};
