mod commands;
mod config;
mod context;
mod hooks;
mod host;
mod migrations;
mod output;
mod tooling;
mod traits;

use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, Subcommand};
use commands::ProcessCommand;
use context::Context;
use hooks::{HookOptions, HookRegistry, LifecycleEvent};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "migrate-import")]
#[command(
    about = "Copy db/migrations from installed packages and local modules into the project",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory containing composer.json (defaults to current directory)
    #[arg(short = 'd', long, global = true)]
    working_dir: Option<PathBuf>,

    /// Vendor directory (defaults to config.vendor-dir from composer.json, then "vendor")
    #[arg(long, global = true)]
    vendor_dir: Option<PathBuf>,

    /// Skip the migrations tool init/test/status step
    #[arg(long, global = true)]
    no_tooling: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Lifecycle hook: run after the dependency manager installs packages
    #[command(name = "post-install-cmd")]
    PostInstall,

    /// Lifecycle hook: run after the dependency manager updates packages
    #[command(name = "post-update-cmd")]
    PostUpdate,

    /// Import migrations only, without touching the migrations tool
    Import,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let working_dir = match cli.working_dir {
        Some(dir) => current_dir.join(dir),
        None => current_dir,
    };

    let mut options = HookOptions {
        working_dir,
        vendor_dir: cli.vendor_dir,
        tooling: !cli.no_tooling,
    };

    let ctx = Context::new();
    let registry = HookRegistry::with_defaults();

    match cli.command {
        Commands::PostInstall => {
            registry.dispatch(LifecycleEvent::PostInstall, &ctx, &options)?;
        }
        Commands::PostUpdate => {
            registry.dispatch(LifecycleEvent::PostUpdate, &ctx, &options)?;
        }
        Commands::Import => {
            options.tooling = false;
            ProcessCommand::execute(&ctx, &options)?;
        }
    }

    Ok(())
}
