use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use nft_deploy::app::{describe_network, load_config, load_contract, registry_from_config};
use nft_deploy::logging::init_tracing;
use nft_deploy::{execute_run, Args, Backend, Command, RunContext};
use nft_deploy_config::validate_config;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let config = load_config(&args).context("failed to load configuration")?;

    // A run needs a valid mode before anything else happens
    if args.command == Command::Run {
        config.lifecycle_mode()?;
    }
    validate_config(&config)?;

    init_tracing(&config.logging.level, config.logging.json)?;

    info!(
        network = %config.network.name,
        rpc_url = %config.network.rpc_url,
        simulate = args.simulate,
        "Starting nft-deploy"
    );

    let contract = load_contract(&config).context("failed to load contract artifact")?;
    let interface_metadata = contract
        .as_ref()
        .map(|c| c.abi.clone())
        .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));

    let backend = Backend::from_config(&config, args.simulate, contract)?;

    match args.command {
        Command::Network => {
            for line in describe_network(&backend).await {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Run => {
            let ctx = RunContext::new(backend.endpoint())
                .with_registry(registry_from_config(&config))
                .with_interface_metadata(interface_metadata);

            let report = execute_run(&config, ctx).await?;

            for line in report.summary_lines() {
                println!("{line}");
            }

            if !report.succeeded() {
                error!(
                    aborted = report.result.is_aborted(),
                    failed = report.result.failed().count(),
                    artifact_written = report.artifact.is_some(),
                    "Run did not complete successfully"
                );
            }
            Ok(ExitCode::from(report.exit_status()))
        }
    }
}
