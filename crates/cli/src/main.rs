//! Bazaar CLI - consistency checks for the storefront's data files.
//!
//! # Usage
//!
//! ```bash
//! # Compare the order log with user histories
//! bazaar-cli reconcile --data-dir data
//!
//! # Validate a catalog file
//! bazaar-cli catalog check --path products.json
//! ```
//!
//! # Commands
//!
//! - `reconcile` - Report orders present on only one side of a commit
//! - `catalog check` - Report duplicate ids, non-positive prices, blank names
//!
//! Both exit non-zero when they find a problem.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bazaar-cli")]
#[command(author, version, about = "Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the global order log with user order histories
    Reconcile {
        /// Storefront data directory
        #[arg(short, long, env = "STOREFRONT_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,
    },
    /// Catalog file tools
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Validate a catalog file
    Check {
        /// Catalog JSON file
        #[arg(short, long, env = "STOREFRONT_CATALOG_PATH", default_value = "products.json")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Reconcile { data_dir } => commands::reconcile::run(&data_dir).await?,
        Commands::Catalog { action } => match action {
            CatalogAction::Check { path } => commands::catalog::check(&path)?,
        },
    }
    Ok(())
}
