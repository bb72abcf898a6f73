mod runtime;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use netrun_config::RuntimeConfig;

#[derive(Parser)]
#[command(name = "netrun", version, about = "netrun — run the integration runtime from a TOML configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a configuration file, start the runtime, and run until interrupted
    Run {
        /// Path to the runtime's TOML configuration file
        #[arg(long, default_value = "netrun.toml")]
        config: PathBuf,
    },
    /// Load and validate a configuration file without starting anything
    CheckConfig {
        #[arg(long, default_value = "netrun.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => run(&config).await,
        Commands::CheckConfig { config } => check_config(&config),
    }
}

async fn run(path: &std::path::Path) -> anyhow::Result<()> {
    let config = RuntimeConfig::load(path)?;
    config.validate()?;

    let enabled = config.enabled_controllers();
    tracing::info!(controllers = enabled.len(), "starting netrun");

    let runtime = runtime::start(&config);
    let cancel = runtime.cancel.clone();

    tokio::signal::ctrl_c().await?;
    tracing::info!("interrupt received, shutting down");
    cancel.cancel();

    let source_count = runtime.registry.len();
    let snapshot = runtime.join().await;

    tracing::info!(sources = source_count, "final registry size");
    for (key, value) in snapshot {
        tracing::info!(counter = %key, value, "statistics");
    }

    Ok(())
}

fn check_config(path: &std::path::Path) -> anyhow::Result<()> {
    let config = RuntimeConfig::load(path)?;
    config.validate()?;

    println!("configuration OK: {}", path.display());
    println!("controllers: {}", config.controllers.len());
    println!("enabled: {}", config.enabled_controllers().join(", "));
    println!("sources: {}", config.sources.len());
    Ok(())
}
