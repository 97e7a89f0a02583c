use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;

use kultur_ingest::api::Downloader;
use kultur_ingest::config::{DbCredentials, FileConfig};
use kultur_ingest::db::{self, ImportReport};
use kultur_ingest::domain::parse_records;
use kultur_ingest::geojson::{self, default_output_path};
use kultur_ingest::logging;
use kultur_ingest::slug::generate_slug;
use kultur_ingest::source::read_rows;

/// Convert cultural venue and event data into GeoJSON and PostGIS-ready rows
///
/// Examples:
///   # Venue/event CSV to GeoJSON (writes events.geojson next to the CSV)
///   kultur-ingest geojson data/events.csv
///
///   # Load the funding budget sheet
///   kultur-ingest -v budget --env .env --src data/budget.csv
///
///   # Download a (gzipped) POI export and load it
///   kultur-ingest poi --env .env --url https://example.org/export/pois.json.gz --table sh_cultural_poi
///
///   # Show the slug for a single venue
///   kultur-ingest slug "Kino Müller" Köln "Hauptstraße 5"
#[derive(Parser, Debug)]
#[command(name = "kultur-ingest")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches kultur-ingest.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print more verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Print detailed debug output
    #[arg(short = 'd', long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a venue/event CSV into a GeoJSON FeatureCollection
    Geojson {
        /// Source CSV file
        src: PathBuf,

        /// Output file (defaults to <src>.geojson next to the source)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Load a multi-year funding budget CSV into the database
    Budget {
        /// Dotenv file with DB_NAME, DB_USER, DB_PASS, DB_HOST, DB_PORT
        #[arg(short = 'e', long)]
        env: PathBuf,

        /// Source CSV file
        #[arg(short = 's', long)]
        src: PathBuf,

        /// Destination table (defaults to the config value or fl_cultural_funding)
        #[arg(short = 't', long)]
        table: Option<String>,
    },

    /// Download a JSON or gzipped JSON POI export and load it into the database
    Poi {
        /// Dotenv file with DB_NAME, DB_USER, DB_PASS, DB_HOST, DB_PORT
        #[arg(short = 'e', long)]
        env: PathBuf,

        /// URL of the export
        #[arg(short = 'u', long)]
        url: String,

        /// Destination table
        #[arg(short = 't', long)]
        table: String,
    },

    /// Print the slug for a venue
    Slug {
        label: String,
        city: String,
        address: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = if let Some(ref config_path) = args.config {
        if !config_path.exists() {
            bail!("Config file not found: {:?}", config_path);
        }
        FileConfig::from_path(config_path)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?
    } else {
        FileConfig::load().unwrap_or_default()
    };

    let verbose = args.verbose || file_config.verbose;
    logging::init(verbose, args.debug);

    match args.command {
        Command::Geojson { src, output } => run_geojson(&src, output),
        Command::Budget { env, src, table } => {
            let table = table.unwrap_or_else(|| file_config.database().budget_table);
            run_budget(&env, &src, &table)
        }
        Command::Poi { env, url, table } => run_poi(&env, &url, &table, &file_config),
        Command::Slug {
            label,
            city,
            address,
        } => {
            println!("{}", generate_slug(&label, &city, &address));
            Ok(())
        }
    }
}

fn run_geojson(src: &Path, output: Option<PathBuf>) -> Result<()> {
    if !src.exists() {
        bail!("Source file not found: {}", src.display());
    }
    let dest = output.unwrap_or_else(|| default_output_path(src));

    let spinner = create_spinner("Converting CSV to GeoJSON...");
    let start = Instant::now();
    let summary = geojson::convert(src, &dest)
        .with_context(|| format!("Failed to convert {}", src.display()))?;
    spinner.finish_with_message(format!(
        "Wrote {} features to {} [{:.1}s]",
        summary.features,
        dest.display(),
        start.elapsed().as_secs_f32()
    ));

    if summary.unclean_slugs > 0 {
        println!(
            "{} slugs are not clean kebab-case (run with -v to list them)",
            summary.unclean_slugs
        );
    }

    Ok(())
}

fn run_budget(env: &Path, src: &Path, table: &str) -> Result<()> {
    let table = db::validate_table_name(table)?;
    let credentials = DbCredentials::from_env_file(env)
        .with_context(|| format!("Failed to read database settings from {}", env.display()))?;

    let spinner = create_spinner("Reading budget CSV...");
    let rows = read_rows(src).with_context(|| format!("Failed to read {}", src.display()))?;
    spinner.finish_with_message(format!("Read {} budget rows", rows.len()));

    let runtime = runtime()?;
    let spinner = create_spinner(&format!("Inserting into {table}..."));
    let start = Instant::now();
    let report = runtime.block_on(async {
        let mut conn = db::connect(&credentials)
            .await
            .context("Failed to connect to database")?;
        Ok::<_, anyhow::Error>(db::load_budget(&mut conn, table, &rows).await)
    })?;
    finish_report(&spinner, table, &report, start);

    Ok(())
}

fn run_poi(env: &Path, url: &str, table: &str, file_config: &FileConfig) -> Result<()> {
    let table = db::validate_table_name(table)?;
    let credentials = DbCredentials::from_env_file(env)
        .with_context(|| format!("Failed to read database settings from {}", env.display()))?;

    let runtime = runtime()?;
    let mut conn = runtime
        .block_on(db::connect(&credentials))
        .context("Failed to connect to database")?;

    // Blocking HTTP must stay outside block_on.
    let spinner = create_spinner(&format!("Downloading {url}..."));
    let start = Instant::now();
    let downloader =
        Downloader::new(file_config.download()).context("Failed to create HTTP client")?;
    let export = downloader
        .fetch_json(url)
        .with_context(|| format!("Failed to download {url}"))?;
    let parsed = parse_records(export).context("POI export is not a JSON array")?;
    spinner.finish_with_message(format!(
        "Fetched {} POIs ({} malformed) [{:.1}s]",
        parsed.records.len(),
        parsed.rejected,
        start.elapsed().as_secs_f32()
    ));

    let spinner = create_spinner(&format!("Inserting into {table}..."));
    let start = Instant::now();
    let report = runtime.block_on(db::load_pois(&mut conn, table, &parsed.records));
    finish_report(&spinner, table, &report, start);

    Ok(())
}

fn finish_report(spinner: &ProgressBar, table: &str, report: &ImportReport, start: Instant) {
    spinner.finish_with_message(format!(
        "{table}: {} rows, {report} [{:.1}s]",
        report.total(),
        start.elapsed().as_secs_f32()
    ));
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
