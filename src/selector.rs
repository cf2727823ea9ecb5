// src/selector.rs
use crate::db::lots::{find_lot, next_available_lot};
use crate::domain::lot::{LotRecord, Platform};
use crate::errors::BotError;
use rusqlite::Connection;
use tracing::debug;

/// Which lot a run should act on.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selection<'a> {
    /// Act on exactly this PIN10, published or not.
    pub explicit_id: Option<&'a str>,
    /// Never pick a lot numbered below this one.
    pub floor: Option<&'a str>,
}

/// Pick the lot to post next.
///
/// With an explicit id the lot is returned as stored, or `None` if unknown.
/// Otherwise it is the lowest-numbered lot at or above the floor that is
/// still unpublished on any of `platforms`. Repeated calls return the same
/// lot until it is marked published.
pub fn select(
    conn: &Connection,
    selection: Selection<'_>,
    platforms: &[Platform],
) -> Result<Option<LotRecord>, BotError> {
    if let Some(id) = selection.explicit_id {
        debug!(lot_id = id, "selecting explicit lot");
        return find_lot(conn, id);
    }

    debug!(floor = ?selection.floor, ?platforms, "selecting next available lot");
    next_available_lot(conn, platforms, selection.floor)
}
