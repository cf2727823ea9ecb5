use crate::config::Config;
use crate::db::connection::Database;
use crate::db::lots::{find_lot, init_schema};
use crate::domain::lot::LotRecord;
use rusqlite::params;

/// (id, address, lat, lon, floors)
pub type SeedLot<'a> = (&'a str, &'a str, f64, f64, Option<i64>);

pub const DAMEN: SeedLot<'static> = ("1000000001", "2023 N DAMEN AVE, CHICAGO, IL 60647", 41.918, -87.678, Some(2));
pub const MILWAUKEE: SeedLot<'static> = ("1000000002", "1550 N MILWAUKEE AVE, CHICAGO, IL 60622", 41.909, -87.676, Some(4));
pub const KEDZIE: SeedLot<'static> = ("1000000010", "3300 W FULLERTON AVE, CHICAGO, IL 60647", 41.924, -87.709, None);

/// Fresh in-memory store holding `lots`, none published.
pub fn init_test_db(lots: &[SeedLot]) -> Database {
    let db = Database::open_in_memory().unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    db.with_conn(|conn| {
        init_schema(conn)?;
        for (id, address, lat, lon, floors) in lots {
            conn.execute(
                "INSERT INTO lots (id, address, lat, lon, floors) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, address, lat, lon, floors],
            )?;
        }
        Ok(())
    })
    .expect("Failed to seed lots");
    db
}

pub fn lot(db: &Database, id: &str) -> LotRecord {
    db.with_conn(|conn| find_lot(conn, id))
        .expect("Failed to read lot")
        .unwrap_or_else(|| panic!("lot {id} missing"))
}

/// Both platforms on, live run.
pub fn test_config() -> Config {
    Config {
        enable_twitter: true,
        enable_bluesky: true,
        google_api_key: Some("test-key".into()),
        ..Config::default()
    }
}
