#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the quake risk toolchain.
//!
//! Paths and server settings come from the same environment variables
//! the server reads (see [`ServerConfig::from_env`]); flags override them.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use quake_risk_database::{DuckDbStore, import};
use quake_risk_geography::load_regions;
use quake_risk_server::{ServerConfig, recalculate_region_counts, run_server};

#[derive(Parser)]
#[command(name = "quake_risk_cli", about = "Quake risk toolchain")]
struct Cli {
    /// Event database file (overrides `QUAKE_RISK_DB`)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port to listen on (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Import a JSON array of earthquake events into the database
    Import {
        /// Path to the JSON catalog
        path: PathBuf,
    },
    /// Recompute per-region event counts and store them
    Recalculate {
        /// Region boundaries `GeoJSON` (overrides `QUAKE_RISK_REGIONS`)
        #[arg(long)]
        regions: Option<PathBuf>,
    },
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let mut config = ServerConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            run_server(config).await?;
        }
        Commands::Import { path } => {
            let start = Instant::now();
            let store = DuckDbStore::open(&config.db_path)?;
            let inserted = import::import_file(&store, &path)?;
            log::info!(
                "Imported {inserted} events from {} in {:.1}s ({} total)",
                path.display(),
                start.elapsed().as_secs_f64(),
                store.count()?
            );
        }
        Commands::Recalculate { regions } => {
            let regions_path = regions.unwrap_or(config.regions_path);
            let store = DuckDbStore::open(&config.db_path)?;
            let regions = load_regions(&regions_path, &config.region_name_property)?;
            let counts = recalculate_region_counts(&store, &store, &regions)?;
            for (region, count) in &counts {
                println!("{region:<40} {count}");
            }
        }
    }

    Ok(())
}
