//! chain-deployer
//!
//! Deploys compiled contract artifacts to one of several configured networks.
//!
//! # Architecture Overview
//!
//! ```text
//!   deploy --network <name>
//!        │
//!        ▼
//!   ┌─────────┐   ┌──────────────┐   ┌─────────────────┐   ┌──────────────┐
//!   │ config  │──▶│   network    │──▶│   blockchain    │──▶│  deployment  │
//!   │ loader  │   │   registry   │   │ ProviderFactory │   │   deployer   │
//!   └─────────┘   └──────────────┘   └────────┬────────┘   └──────┬───────┘
//!                                             │                   │
//!                                  credentials (env, lazy)   policy enforcer
//!                                                            (confirmations,
//!                                                             timeout blocks)
//! ```
//!
//! # Exit Codes
//! - 0: all requested contracts confirmed (or simulated with `--dry-run`)
//! - 2: unknown network
//! - 3: missing credential
//! - 4: deployment timed out
//! - 5: deployment cancelled
//! - 6: invalid configuration
//! - 1: any other failure

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chain_deployer::blockchain::{EnvCredentialSource, ProviderFactory};
use chain_deployer::config::{load_config, LoadedConfig};
use chain_deployer::deployment::artifact::{load_artifacts, select_artifacts};
use chain_deployer::deployment::{DeployOptions, Deployer, DeploymentOutcome};
use chain_deployer::error::DeployerError;
use chain_deployer::lifecycle::{signals, Cancellation};
use chain_deployer::observability::logging;
use chain_deployer::resilience::backoff::BackoffPolicy;

#[derive(Parser)]
#[command(name = "chain-deployer")]
#[command(about = "Deploy compiled contracts to configured networks", long_about = None)]
struct Cli {
    /// Path to the deployment configuration
    #[arg(short, long, env = "DEPLOYER_CONFIG", default_value = "deployer.toml")]
    config: PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured networks in declaration order
    Networks,
    /// Print the resolved profile of a network
    Show {
        #[arg(short, long)]
        network: String,
    },
    /// Deploy compiled artifacts to a network
    Deploy {
        #[arg(short, long)]
        network: String,

        /// Deploy only these contracts (repeatable, default: all)
        #[arg(long = "contract")]
        contracts: Vec<String>,

        /// Simulate every deployment without submitting
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present (non-fatal)
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "chain-deployer failed");
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), DeployerError> {
    let loaded = load_config(&cli.config);

    let level = cli
        .log_level
        .clone()
        .or_else(|| {
            loaded
                .as_ref()
                .ok()
                .map(|l| l.settings.observability.log_level.clone())
        })
        .unwrap_or_else(|| "info".to_string());
    logging::init(&level);

    let LoadedConfig { settings, registry } = loaded?;
    tracing::info!(
        config = %cli.config.display(),
        networks = registry.len(),
        solc = %settings.compilers.solc.version,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Networks => {
            for profile in registry.iter() {
                println!(
                    "{:<16} {:<7} network_id={}",
                    profile.name,
                    profile.kind(),
                    profile.network_id
                );
            }
        }
        Commands::Show { network } => {
            let profile = registry.lookup(&network)?;
            println!("{}", serde_json::to_string_pretty(profile)?);
        }
        Commands::Deploy {
            network,
            contracts,
            dry_run,
        } => {
            let profile = registry.lookup(&network)?;
            let artifacts = select_artifacts(
                load_artifacts(&settings.contracts_build_directory)?,
                &contracts,
            )?;
            if artifacts.is_empty() {
                tracing::warn!(
                    dir = %settings.contracts_build_directory.display(),
                    "No deployable artifacts found"
                );
                return Ok(());
            }

            let factory = ProviderFactory::new(
                Arc::new(EnvCredentialSource::from_env()),
                Duration::from_secs(settings.rpc.timeout_secs),
            );
            let handle = factory.get(profile).await?;

            let cancellation = Arc::new(Cancellation::new());
            signals::cancel_on_ctrl_c(cancellation.clone());

            let deployer = Deployer::new(DeployOptions {
                dry_run_only: dry_run,
                backoff: BackoffPolicy::from(&settings.rpc),
            });
            let outcomes = deployer
                .deploy_all(profile, &*handle, &artifacts, cancellation.token())
                .await?;

            for outcome in outcomes {
                match outcome {
                    DeploymentOutcome::Simulated { contract, gas } => {
                        println!("{}: dry run ok (estimated gas {})", contract, gas);
                    }
                    DeploymentOutcome::Deployed(receipt) => {
                        let address = receipt
                            .contract_address
                            .map(|a| a.to_string())
                            .unwrap_or_else(|| "<pending>".to_string());
                        println!(
                            "{}: deployed at {} (tx {}, {} confirmations)",
                            receipt.contract, address, receipt.tx_hash, receipt.confirmations
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
