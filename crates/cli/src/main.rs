//! DokterBubung CLI - database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Create or update the hospital schema
//! db-cli migrate
//!
//! # Load the bundled medicines and patients into an empty database
//! db-cli seed
//!
//! # Load a custom data set
//! db-cli seed --file ./ward-b.yaml
//! ```
//!
//! Both commands read `HOSPITAL_DATABASE_URL` (falling back to `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "db-cli")]
#[command(author, version, about = "DokterBubung CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed an empty database with medicines and patients
    Seed {
        /// YAML file to load instead of the bundled data set
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { file } => commands::seed::run(file.as_deref()).await,
    }
}
