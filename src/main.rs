//! # logwell CLI
//!
//! The `logwell` binary runs the log service and its operational helpers.
//!
//! ## Usage
//!
//! ```bash
//! logwell --config ./config/logwell.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `logwell serve` | Provision the store, then serve the HTTP API |
//! | `logwell provision` | Provision the store (policy, template, alias) and exit |
//! | `logwell ping` | Check whether the search backend is reachable |

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use logwell::config;
use logwell::elastic::ElasticStore;
use logwell::provision;
use logwell::server;
use logwell::store::LogStore;

/// A centralized log ingestion and query service backed by a
/// document-search engine.
#[derive(Parser)]
#[command(
    name = "logwell",
    about = "Centralized log ingestion and query service",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/logwell.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Provision the store, then serve the HTTP API until terminated.
    ///
    /// Provisioning failures are fatal: the process refuses to serve
    /// traffic against a half-provisioned store.
    Serve,

    /// Provision the store (lifecycle policy, index template, write
    /// alias) and exit. Idempotent; safe to run repeatedly.
    Provision,

    /// Check whether the search backend is reachable. Prints `up` or
    /// `down`; exits non-zero when down.
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;
    let store = ElasticStore::new(&config.store)?;

    match cli.command {
        Commands::Serve => {
            provision::ensure_provisioned(&store)
                .await
                .context("provisioning the log store failed")?;

            let store: Arc<dyn LogStore> = Arc::new(store);
            server::run_server(&config.server.bind, store, config::api_key_from_env()).await?;
        }
        Commands::Provision => {
            provision::ensure_provisioned(&store)
                .await
                .context("provisioning the log store failed")?;
            println!("provisioned alias '{}'", store.alias());
        }
        Commands::Ping => {
            if store.ping().await {
                println!("up");
            } else {
                println!("down");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
