#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the slope map toolchain.
//!
//! `slope_map serve` starts the API server; `summary` prints the seed
//! dataset breakdown without starting anything; `reset` wipes the
//! annotation scratch file.

use clap::{Parser, Subcommand};
use slope_map_annotations::ScratchStore;
use slope_map_view::{FilterState, ViewModel};

#[derive(Parser)]
#[command(name = "slope_map", about = "Landslide sensor map prototype")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve,
    /// Print seed dataset totals and the per-risk breakdown
    Summary,
    /// Delete the annotation scratch file (clears all notes, checkpoints,
    /// and drawn areas)
    Reset,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            // The server uses actix-web's runtime, so run it in a blocking
            // task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(slope_map_server::run_server())
            })
            .await??;
        }
        Commands::Summary => print_summary(),
        Commands::Reset => {
            let path = ScratchStore::default_path();
            match std::fs::remove_file(&path) {
                Ok(()) => println!("Removed scratch file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    println!("No scratch file at {}", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

fn print_summary() {
    let sensors = slope_map_dataset::seed_sensors();
    let areas = slope_map_dataset::seed_areas();
    let vm = ViewModel::derive(&sensors, &FilterState::default());

    println!("Seed sensors: {}", sensors.len());
    println!("Seed risk areas: {}", areas.len());
    println!();
    for count in &vm.counts {
        println!("  {:<10} {}", count.risk.to_string(), count.count);
    }
    if let Some(bounds) = vm.bounds {
        println!();
        println!(
            "Bounds: [{:.4}, {:.4}] - [{:.4}, {:.4}]",
            bounds.west, bounds.south, bounds.east, bounds.north
        );
    }
}
