//! Hospital admin CLI
//!
//! Command-line console for bed allotment, medicine inventory and the patient registry.

use std::path::PathBuf;

use clap::Parser;
use hospital_admin::console::Command;
use hospital_admin::{load_config, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "hospital-admin")]
#[command(about = "Hospital bed, inventory and patient administration")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Facility to work on, by name or 0-based index
    #[arg(short, long)]
    facility: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, facility={:?}, log_level={:?}",
        args.config,
        args.facility,
        args.log_level
    );

    let config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    match hospital_admin::run(config, args.facility.as_deref(), args.command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
