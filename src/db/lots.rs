// src/db/lots.rs
use crate::domain::lot::{LotRecord, Platform, Publications};
use crate::errors::BotError;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SQL_LOTS_SCHEMA: &str = include_str!("../../sql/lots.sql");

const LOT_COLUMNS: &str =
    "id, address, lat, lon, floors, published_twitter, published_bluesky";

/// A row produced by ingestion. Coordinates start at the 0.0 sentinel and
/// nothing is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLot {
    pub id: String,
    pub address: String,
}

pub fn init_schema(conn: &Connection) -> Result<(), BotError> {
    conn.execute_batch(SQL_LOTS_SCHEMA)
        .map_err(|e| BotError::Db(format!("Failed to apply lots schema: {e}")))
}

/// Drop the table and rebuild it from `lots`, in one transaction.
pub fn replace_lots(conn: &mut Connection, lots: &[NewLot]) -> Result<usize, BotError> {
    let tx = conn.transaction()?;

    tx.execute("DROP TABLE IF EXISTS lots", [])?;
    tx.execute_batch(SQL_LOTS_SCHEMA)?;

    {
        let mut stmt = tx.prepare("INSERT INTO lots (id, address, lat, lon) VALUES (?1, ?2, 0.0, 0.0)")?;
        for lot in lots {
            stmt.execute(params![lot.id, lot.address])?;
        }
    }

    tx.commit()?;
    Ok(lots.len())
}

pub fn count_lots(conn: &Connection) -> Result<i64, BotError> {
    conn.query_row("SELECT count(*) FROM lots", [], |r| r.get(0))
        .map_err(|e| BotError::Db(format!("count lots failed: {e}")))
}

pub fn find_lot(conn: &Connection, id: &str) -> Result<Option<LotRecord>, BotError> {
    let sql = format!("SELECT {LOT_COLUMNS} FROM lots WHERE id = ?1 LIMIT 1");
    conn.query_row(&sql, params![id], lot_from_row)
        .optional()
        .map_err(|e| BotError::Db(format!("select lot {id} failed: {e}")))
}

/// SQL condition for "not yet published on `platform`". `'0'` is what older
/// databases used for unset.
fn unpublished(platform: Platform) -> String {
    let col = platform.column();
    format!("({col} IS NULL OR {col} = '0')")
}

/// Lowest-numbered lot with id >= `floor` that is still unpublished on at
/// least one of `platforms`.
pub fn next_available_lot(
    conn: &Connection,
    platforms: &[Platform],
    floor: Option<&str>,
) -> Result<Option<LotRecord>, BotError> {
    if platforms.is_empty() {
        return Ok(None);
    }

    let available = platforms
        .iter()
        .map(|p| unpublished(*p))
        .collect::<Vec<_>>()
        .join(" OR ");

    let sql = format!(
        r#"
        SELECT {LOT_COLUMNS}
        FROM lots
        WHERE (?1 IS NULL OR CAST(id AS INTEGER) >= CAST(?1 AS INTEGER))
          AND ({available})
        ORDER BY CAST(id AS INTEGER) ASC, id ASC
        LIMIT 1
        "#
    );

    conn.query_row(&sql, params![floor], lot_from_row)
        .optional()
        .map_err(|e| BotError::Db(format!("select next lot failed: {e}")))
}

/// Record `post_id` as the lot's publication on `platform`.
pub fn mark_published(
    conn: &Connection,
    id: &str,
    platform: Platform,
    post_id: &str,
) -> Result<(), BotError> {
    let sql = format!("UPDATE lots SET {} = ?1 WHERE id = ?2", platform.column());
    let updated = conn
        .execute(&sql, params![post_id, id])
        .map_err(|e| BotError::Db(format!("mark lot {id} published failed: {e}")))?;

    if updated == 0 {
        return Err(BotError::Db(format!("lot {id} not found")));
    }
    Ok(())
}

/// Mark every lot numbered at or below `through_id` as already published on
/// `platform`, storing `marker` as its post id. Lots that already carry a
/// real post id keep it. Returns the number of lots touched.
pub fn backfill_published(
    conn: &Connection,
    platform: Platform,
    through_id: &str,
    marker: &str,
) -> Result<usize, BotError> {
    let sql = format!(
        "UPDATE lots SET {col} = ?2 WHERE CAST(id AS INTEGER) <= CAST(?1 AS INTEGER) AND {cond}",
        col = platform.column(),
        cond = unpublished(platform),
    );
    conn.execute(&sql, params![through_id, marker])
        .map_err(|e| BotError::Db(format!("backfill {platform} failed: {e}")))
}

fn publication(raw: Option<String>) -> Option<String> {
    raw.filter(|v| v != "0")
}

fn floors(value: Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(i as f64),
        Value::Real(f) => Some(f),
        Value::Text(t) => t.trim().parse().ok(),
        Value::Null | Value::Blob(_) => None,
    }
}

fn lot_from_row(row: &Row<'_>) -> rusqlite::Result<LotRecord> {
    Ok(LotRecord {
        id: row.get(0)?,
        address: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        lat: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
        lon: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
        floors: floors(row.get(4)?),
        published: Publications {
            twitter: publication(row.get(5)?),
            bluesky: publication(row.get(6)?),
        },
    })
}
