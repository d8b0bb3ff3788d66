//! Ocean colour product fetch tool.
//!
//! Searches the Copernicus product catalogue with typed attribute,
//! time-window, and area filters, writes the matches as JSON lines,
//! optionally downloads the matching payloads, and can summarize
//! already-unpacked products offline.

mod config;
mod inspect;
mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::ArchiveConfig;

#[derive(Parser, Debug)]
#[command(name = "ocean-fetch")]
#[command(about = "Search and fetch ocean colour products from the Copernicus archive")]
struct Args {
    /// Search window start (2022-07-01, 2022-07-01T12:00, ...)
    #[arg(long)]
    start: Option<String>,

    /// Search window end
    #[arg(long)]
    end: Option<String>,

    /// Maximum number of products to return (default from config)
    #[arg(long)]
    max_results: Option<u32>,

    /// Area of interest as a WKT polygon with "lat lon" corners
    #[arg(long)]
    area: Option<String>,

    /// Named region from the config file
    #[arg(long, conflicts_with = "area")]
    region: Option<String>,

    /// Area of interest as a CSV file of lat,lon rows
    #[arg(long, conflicts_with_all = ["area", "region"])]
    area_file: Option<PathBuf>,

    /// Attribute filter as NAME=VALUE (repeatable)
    #[arg(long = "attribute", value_name = "NAME=VALUE")]
    attributes: Vec<String>,

    /// Write results to this file as JSON lines (default stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Download the payload of every matched product
    #[arg(long)]
    download: bool,

    /// Directory for downloaded payloads
    #[arg(long, default_value = "/data/ocean-products")]
    output_dir: PathBuf,

    /// Maximum concurrent downloads
    #[arg(long, default_value = "4")]
    max_concurrent: usize,

    /// Archive username for downloads
    #[arg(long, env = "CDSE_USERNAME")]
    username: Option<String>,

    /// Archive password for downloads
    #[arg(long, env = "CDSE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Summarize unpacked .SEN3 products under this directory instead of searching
    #[arg(long)]
    inspect_dir: Option<PathBuf>,

    /// Channel to read when inspecting (repeatable; default from config)
    #[arg(long = "channel")]
    channels: Vec<String>,

    /// Configuration file
    #[arg(long, env = "ARCHIVE_CONFIG", default_value = "config/archive.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr; stdout is reserved for JSON-lines output.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = ArchiveConfig::load_or_default(&args.config)?;

    if let Some(dir) = &args.inspect_dir {
        info!(path = %dir.display(), "Inspecting unpacked products");

        let channels = if args.channels.is_empty() {
            config.inspect.channels.clone()
        } else {
            args.channels.clone()
        };

        let reader = sen3_parser::NcdumpReader::new();
        let reports = inspect::inspect_products(&reader, dir, &channels)?;
        run::write_json_lines(&reports, args.output.as_deref())?;
        return Ok(());
    }

    run::run_search(&args, &config).await
}
