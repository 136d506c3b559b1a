use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use tradetracker_core::Period;

mod commands;
mod config;

use commands::App;

#[derive(Debug, Parser)]
#[command(name = "tradetracker", version, about = "Record business income and expenses from voice notes and receipts")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Never call remote services for parsing
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse a spoken or typed transaction note
    Voice {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Scan a receipt photo (JPEG, PNG or WebP)
    Receipt { image: PathBuf },
    /// Parse receipt text that was already recognized
    ReceiptText { file: PathBuf },
    /// Summarize transactions from a CSV file
    Analytics {
        csv: PathBuf,
        #[arg(long, default_value = "last_30_days")]
        period: Period,
        /// Reference date for the period, YYYY-MM-DD
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Also write the selected transactions to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// List the categories in use
    Categories,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;
    let today = match &cli.command {
        Commands::Analytics { today: Some(d), .. } => *d,
        _ => chrono::Local::now().date_naive(),
    };
    let app = App::new(config, cli.offline, today)?;

    match cli.command {
        Commands::Voice { text } => print_json(&commands::voice(&app, &text.join(" ")).await),
        Commands::Receipt { image } => print_json(&commands::receipt(&app, &image).await?),
        Commands::ReceiptText { file } => print_json(&commands::receipt_text(&app, &file).await?),
        Commands::Analytics { csv, period, export, .. } => {
            print_json(&commands::analytics(&app, &csv, period, export.as_deref())?)
        }
        Commands::Categories => print_json(&app.categories),
    }
}
