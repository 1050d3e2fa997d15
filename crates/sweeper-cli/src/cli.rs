use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sweeper", version, about = "Retention expiry and deadline notifications for the kanban backend")]
pub struct Cli {
    /// SQLite database shared with the web application.
    #[arg(long, env = "SWEEPER_DATABASE", default_value = "crm.db", global = true)]
    pub database: PathBuf,

    /// Directory that relative file paths in the `files` table resolve against.
    #[arg(long, env = "SWEEPER_UPLOAD_DIR", default_value = "uploads", global = true)]
    pub upload_dir: PathBuf,

    /// Log filter, e.g. `info` or `sweeper_core=debug`. `RUST_LOG` wins when set.
    #[arg(long, env = "SWEEPER_LOG", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sweep loop until Ctrl-C.
    Run(SweepArgs),
    /// Run a single cycle and print its report as JSON.
    Once(SweepArgs),
    /// Create or migrate the database schema, then exit.
    InitDb,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Seconds between the end of one cycle and the start of the next.
    #[arg(long, env = "SWEEPER_INTERVAL_SECS", default_value_t = sweeper_core::config::DEFAULT_INTERVAL_SECS)]
    pub interval_secs: u64,

    /// Whole days after today that still count as "due soon".
    #[arg(long, env = "SWEEPER_DUE_SOON_DAYS", default_value_t = 1)]
    pub due_soon_days: u32,
}
