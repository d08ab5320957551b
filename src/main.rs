//! CLI entry point for the FTO census statistics tool.
//!
//! Provides subcommands for analyzing an accumulated census CSV and for
//! scraping one new observation from the upstream site.

use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fto_stats::{
    fetch::BasicClient,
    loader::load_series,
    output::{append_row, render_json, render_monthly_table, render_records},
    scrape::scrape_row,
    source::CensusSource,
    stats::{monthly_aggregate, summary_records},
};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fto_stats")]
#[command(about = "Monthly statistics for FTO population census data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an accumulated census CSV from a file or URL
    Analyze {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Emit the result as JSON instead of a text table
        #[arg(long, default_value_t = false)]
        json: bool,

        /// HTTP request timeout in seconds for URL sources
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
    /// Scrape one census row from the live site and append it to a CSV
    Scrape {
        /// CSV file to append the row to
        #[arg(short, long, default_value = "data.csv")]
        output: String,

        /// HTTP request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/fto_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("fto_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            source,
            json,
            timeout,
        } => {
            let client = BasicClient::with_timeout(Duration::from_secs(timeout))?;
            let frame = load_series(CensusSource::from_arg(&source), &client).await?;
            let monthly = monthly_aggregate(&frame);
            let records = summary_records(&frame, &monthly);

            if json {
                println!("{}", render_json(&monthly, &records)?);
            } else {
                println!("{}", render_monthly_table(&monthly));
                print!("{}", render_records(&records));
            }
        }
        Commands::Scrape { output, timeout } => {
            let client = BasicClient::with_timeout(Duration::from_secs(timeout))?;
            let row = scrape_row(&client).await?;
            append_row(&output, &row)?;
            info!(
                output,
                population = row.population,
                birth_queue = row.birth_queue,
                pregnant = row.pregnant,
                "Census row appended"
            );
        }
    }

    Ok(())
}
