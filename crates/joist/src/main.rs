//! Joist CLI - static site build pipeline with live reload.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "joist")]
#[command(about = "Static site build pipeline with live-reload dev server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to site.toml config file
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean and rebuild the output directory
    Build,

    /// Build, then serve the output with watch and live reload
    Serve {
        /// Port to listen on (overrides site.toml)
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Delete the output directory
    Clean,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command; bare `joist` is `joist serve`
    match cli.command {
        Some(Commands::Build) => {
            commands::build::run(&cli.config).await?;
        }
        Some(Commands::Clean) => {
            commands::clean::run(&cli.config).await?;
        }
        Some(Commands::Serve { port, no_open }) => {
            commands::serve::run(&cli.config, port, no_open).await?;
        }
        None => {
            commands::serve::run(&cli.config, None, false).await?;
        }
    }

    Ok(())
}
