// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! contentsync CLI
//!
//! Host for the startup content synchronization pipeline.
//!
//! Exit codes: `0` clean or bypassed, `1` cancelled, `2` configuration or
//! setup error.

mod commands;
mod config;
mod display;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::Overrides;

/// Exit code for configuration and setup errors.
const EXIT_SETUP_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "contentsync")]
#[command(version, about = "Startup content synchronization")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file
    #[arg(long, global = true, env = "CONTENTSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory (default: platform data dir)
    #[arg(long, global = true, env = "CONTENTSYNC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Remote content URL
    #[arg(long, global = true, env = "CONTENTSYNC_REMOTE_URL")]
    remote_url: Option<String>,

    /// Endpoint probed for reachability
    #[arg(long, global = true, env = "CONTENTSYNC_PROBE_ENDPOINT")]
    probe_endpoint: Option<String>,

    /// Bundled catalog (file path or URL)
    #[arg(long, global = true, env = "CONTENTSYNC_LOCAL_CATALOG")]
    local_catalog: Option<String>,

    /// Proxy URL (e.g. socks5://127.0.0.1:9050)
    #[arg(long, global = true, env = "CONTENTSYNC_PROXY")]
    proxy: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize content with the remote store
    Sync {
        /// Skip synchronization entirely (local development)
        #[arg(long, env = "CONTENTSYNC_LOCAL_MODE")]
        local_mode: bool,
    },

    /// Show the local sync state
    Status,

    /// Clear the bootstrap flag
    Reset,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "contentsync=debug,contentsync_core=debug"
    } else {
        "contentsync=info,contentsync_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = config::resolve(
        cli.config.as_deref(),
        Overrides {
            data_dir: cli.data_dir,
            remote_url: cli.remote_url,
            probe_endpoint: cli.probe_endpoint,
            local_catalog: cli.local_catalog,
            proxy: cli.proxy,
        },
    )?;

    match cli.command {
        Commands::Sync { local_mode } => commands::sync::run(&config, local_mode).await,
        Commands::Status => {
            commands::status::run(&config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Reset => {
            commands::reset::run(&config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            display::error(&format!("{e:#}"));
            ExitCode::from(EXIT_SETUP_ERROR)
        }
    }
}
