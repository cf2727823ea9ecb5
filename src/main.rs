use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::{Bot, RunOutcome};
use crate::config::Config;
use crate::db::connection::Database;
use crate::errors::BotError;
use crate::http::http_client;
use crate::publish::LivePublishers;
use crate::streetview::{GoogleGeocoder, StreetViewClient};

mod bot;
mod config;
mod db;
mod domain;
mod errors;
mod http;
mod ingest;
mod publish;
mod selector;
mod streetview;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "everylot")]
#[command(about = "Post a Street View photo of every lot in Cook County")]
#[command(version)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Post the next available lot
    Post(PostArgs),

    /// Rebuild the lots table from the county parcel-address dataset
    Ingest(IngestArgs),
}

#[derive(Args)]
struct PostArgs {
    /// SQLite database path
    #[arg(long)]
    database: Option<String>,

    /// Post this PIN10 instead of the next available lot
    #[arg(long)]
    id: Option<String>,

    /// Street View search format, e.g. "{address}, CHICAGO, IL"
    #[arg(short, long = "search-format")]
    search_format: Option<String>,

    /// Post text format
    #[arg(short, long = "print-format")]
    print_format: Option<String>,

    /// Select and compose but do not post or record anything
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct IngestArgs {
    #[arg(long)]
    year: Option<String>,

    #[arg(long)]
    city: Option<String>,

    /// SQLite database path
    #[arg(long)]
    database: Option<String>,

    /// Mark every lot up to and including this PIN10 as already posted
    #[arg(long)]
    start_id: Option<String>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Post(args) => {
            if let Some(path) = args.database {
                config.database_path = path;
            }
            if let Some(f) = args.search_format {
                config.search_format = f;
            }
            if let Some(f) = args.print_format {
                config.print_format = f;
            }
            config.dry_run |= args.dry_run;
            exit_code(post(&config, args.id.as_deref()), false)
        }
        Commands::Ingest(args) => {
            if let Some(path) = args.database {
                config.database_path = path;
            }
            if let Some(year) = args.year {
                config.ingest_year = year;
            }
            if let Some(city) = args.city {
                config.ingest_city = city;
            }
            if args.start_id.is_some() {
                config.start_id = args.start_id;
            }
            exit_code(ingest(&config), true)
        }
    }
}

/// A post run fails the process only on fatal errors; anything else leaves
/// the lot for the next scheduled run. An ingest fails on any error.
fn exit_code(result: Result<(), BotError>, strict: bool) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if strict || e.is_fatal() => {
            error!(error = %e, fatal = e.is_fatal(), "run failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            warn!(error = %e, "run failed, will retry on the next run");
            ExitCode::SUCCESS
        }
    }
}

fn post(config: &Config, id: Option<&str>) -> Result<(), BotError> {
    let db = Database::open(&config.database_path)?;
    db.init()?;

    let client = http_client()?;
    let google_key = config.google_api_key.clone().unwrap_or_default();
    let geocoder = GoogleGeocoder::new(client.clone(), google_key.clone());
    let imagery = StreetViewClient::new(client.clone(), google_key, config.streetview_size.clone());
    let publishers = LivePublishers::new(client, config);

    let bot = Bot::new(config, &db, &geocoder, &imagery, &publishers)?;
    match bot.run(id)? {
        RunOutcome::NoLot => info!("nothing to post"),
        RunOutcome::DryRun { lot_id, text } => info!(%lot_id, %text, "dry run finished"),
        RunOutcome::Posted { lot_id, post_ids } => {
            for (platform, post_id) in post_ids {
                info!(%lot_id, %platform, %post_id, "recorded post");
            }
        }
        RunOutcome::NothingPosted { lot_id } => warn!(%lot_id, "no platform accepted the post"),
        RunOutcome::Skipped { lot_id, reason } => warn!(%lot_id, %reason, "lot skipped"),
    }
    Ok(())
}

fn ingest(config: &Config) -> Result<(), BotError> {
    let db = Database::open(&config.database_path)?;
    let summary = ingest::run_ingest(http_client()?, config, &db)?;
    info!(
        rows = summary.rows_fetched,
        lots = summary.lots_written,
        backfilled = summary.backfilled,
        "ingestion finished"
    );
    Ok(())
}
