mod cli;
mod logging;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, SweepArgs};
use sweeper_core::impls::{LocalArtifactStore, SqliteStore};
use sweeper_core::{Sweeper, SweeperBuilder, SweeperConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    let store = SqliteStore::open(&cli.database)
        .with_context(|| format!("failed to open database {}", cli.database.display()))?;

    match &cli.command {
        Commands::InitDb => {
            info!(database = %cli.database.display(), "schema is up to date");
        }
        Commands::Once(args) => {
            let sweeper = build(&cli, args, store)?;
            let report = sweeper.run_cycle().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Run(args) => {
            let handle = build(&cli, args, store)?.start();
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for Ctrl-C")?;
            info!("received Ctrl-C, stopping after the current cycle");
            handle.stop().await;
        }
    }

    Ok(())
}

fn build(cli: &Cli, args: &SweepArgs, store: SqliteStore) -> anyhow::Result<Sweeper> {
    let config = SweeperConfig::default()
        .with_interval(Duration::from_secs(args.interval_secs))
        .with_due_soon_days(args.due_soon_days);

    SweeperBuilder::new()
        .store(Arc::new(store))
        .artifacts(Arc::new(LocalArtifactStore::new(cli.upload_dir.clone())))
        .config(config)
        .build()
        .context("invalid sweeper configuration")
}
