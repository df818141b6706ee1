#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the hazard map service.
//!
//! ```text
//! hazard_map_cli serve [--bind 0.0.0.0] [--port 8080]
//! hazard_map_cli cleanup
//! hazard_map_cli stats
//! ```
//!
//! Every subcommand reads the same environment variables as the server
//! (`DATABASE_URL`, `HAZARD_STORE`, ...). `cleanup` is meant to be run
//! from cron.

use clap::{Parser, Subcommand};
use hazard_map_reports::HazardService;
use hazard_map_server::{config::ServerConfig, open_store, run_server};

#[derive(Parser)]
#[command(name = "hazard_map_cli", about = "Hazard map service tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind (overrides `BIND_ADDR`)
        #[arg(long)]
        bind: Option<String>,
        /// Port to bind (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Delete hazards older than the active window
    Cleanup,
    /// Print active hazard counts by type
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let mut config = ServerConfig::from_env()?;

    match cli.command {
        Commands::Serve { bind, port } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }
            log::info!("Serving with {} store", config.store);

            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(run_server(config))
            })
            .await??;
        }
        Commands::Cleanup => {
            let service = HazardService::new(open_store(&config).await?);
            let deleted = service.cleanup().await?;
            log::info!("Cleanup pass finished");
            println!("Deleted {deleted} expired hazard(s).");
        }
        Commands::Stats => {
            let service = HazardService::new(open_store(&config).await?);
            let stats = service.stats().await?;
            log::debug!("Fetched stats for {} hazard type(s)", stats.by_type.len());

            println!("Active hazards: {}", stats.total);
            if stats.by_type.is_empty() {
                return Ok(());
            }
            println!();
            for entry in &stats.by_type {
                println!("  {:<14} {:>6}", entry.hazard_type.to_string(), entry.count);
            }
        }
    }

    Ok(())
}
