// src/ingest/mod.rs
pub mod client;
pub mod models;

pub use client::SodaClient;
pub use models::ParcelRow;

use std::collections::HashSet;

use reqwest::blocking::Client;
use tracing::info;

use crate::config::Config;
use crate::db::connection::Database;
use crate::db::lots::{backfill_published, replace_lots, NewLot};
use crate::errors::BotError;

/// Post id stored for lots marked published by a start-id backfill.
pub const BACKFILL_MARKER: &str = "backfill";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub rows_fetched: usize,
    pub lots_written: usize,
    /// Lots marked published per enabled platform by the start-id backfill.
    pub backfilled: usize,
}

/// Keep the first row per 10-digit PIN. Rows arrive ordered by 14-digit PIN,
/// so this is the lowest sub-unit of each parcel.
pub fn dedup_by_pin10(rows: Vec<ParcelRow>) -> Vec<ParcelRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.coarse_key()))
        .collect()
}

fn to_new_lots(rows: &[ParcelRow]) -> Vec<NewLot> {
    rows.iter()
        .map(|row| NewLot {
            id: row.coarse_key(),
            address: row.lot_address(),
        })
        .collect()
}

/// Rebuild the lots table from the dataset. Nothing is written unless every
/// page was fetched.
pub fn run_ingest(client: Client, config: &Config, db: &Database) -> Result<IngestSummary, BotError> {
    let soda = SodaClient::new(client, config.data_portal_token.as_deref(), config.ingest_batch_size)?;
    ingest_with(&soda, config, db)
}

pub(crate) fn ingest_with(soda: &SodaClient, config: &Config, db: &Database) -> Result<IngestSummary, BotError> {
    info!(year = %config.ingest_year, city = %config.ingest_city, "fetching parcel addresses");
    let rows = soda.fetch_all(&config.ingest_year, &config.ingest_city)?;
    let rows_fetched = rows.len();

    let unique = dedup_by_pin10(rows);
    let lots = to_new_lots(&unique);
    info!(rows = rows_fetched, lots = lots.len(), "deduplicated by PIN10");

    let platforms = config.enabled_platforms();
    let (lots_written, backfilled) = db.with_conn(|conn| {
        let written = replace_lots(conn, &lots)?;

        let mut backfilled = 0;
        if let Some(start_id) = config.start_id.as_deref() {
            for platform in &platforms {
                let n = backfill_published(conn, *platform, start_id, BACKFILL_MARKER)?;
                info!(%platform, start_id, lots = n, "marked earlier lots as published");
                backfilled = backfilled.max(n);
            }
        }
        Ok((written, backfilled))
    })?;

    info!(lots = lots_written, path = %config.database_path, "lots table replaced");
    Ok(IngestSummary {
        rows_fetched,
        lots_written,
        backfilled,
    })
}
