//! CLI parser and command handlers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use vendbot_config::{resolve_from_env, BootstrapError};

use crate::runner::bootstrap;

#[derive(Parser, Debug)]
#[command(name = "vendbot")]
#[command(about = "VendBot configuration bootstrap: check, show, prepare", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Dotenv file with defaults; process environment wins. A missing file is fine.
    #[arg(long, global = true, default_value = ".env")]
    pub env_file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Resolve and validate configuration; exit 1 when rejected, 2 on unreadable input.
    Check,
    /// Print the masked configuration summary.
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Resolve, start logging, build backend handles and create the local storage layout.
    Prepare,
}

/// Exit code for a failed command: 1 when validation rejected the configuration, 2 otherwise.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<BootstrapError>()
        .map_or(2, BootstrapError::exit_code)
}

pub async fn execute(cli: Cli) -> Result<()> {
    let env_file = cli.env_file.as_path();
    match cli.command {
        Commands::Check => handle_check(env_file),
        Commands::Show { json } => handle_show(env_file, json),
        Commands::Prepare => handle_prepare(env_file).await,
    }
}

fn handle_check(env_file: &Path) -> Result<()> {
    let config = resolve_from_env(Some(env_file))?;
    println!("OK");
    println!("{}", config.summary());
    Ok(())
}

fn handle_show(env_file: &Path, json: bool) -> Result<()> {
    let summary = resolve_from_env(Some(env_file))?.summary();
    if json {
        let rendered =
            serde_json::to_string_pretty(&summary).context("serialize configuration summary")?;
        println!("{}", rendered);
    } else {
        println!("{}", summary);
    }
    Ok(())
}

/// Everything short of connecting: handles are built, SQLite's directory and the local upload
/// layout are created.
async fn handle_prepare(env_file: &Path) -> Result<()> {
    let booted = bootstrap(Some(env_file))?;

    booted.handles.database.ensure_parent_dir().await?;
    let dirs = booted.handles.storage.ensure_layout().await?;
    for dir in &dirs {
        println!("ready: {}", dir.display());
    }

    info!(
        stage = %booted.config.stage,
        database = booted.handles.database.kind(),
        storage_dirs = dirs.len(),
        "Backends prepared"
    );
    println!(
        "{} prepared for {} stage",
        booted.config.app_name, booted.config.stage
    );
    Ok(())
}
