use rusqlite::Connection;
use std::cell::RefCell;
use std::path::Path;

use crate::db::lots::init_schema;
use crate::errors::BotError;

/// The lots store. One connection per process; the bot is single-threaded.
pub struct Database {
    conn: RefCell<Connection>,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BotError> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .map_err(|e| BotError::Db(format!("Open DB {} failed: {e}", path.display())))?;
        Ok(Self {
            conn: RefCell::new(conn),
        })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, BotError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| BotError::Db(format!("Open in-memory DB failed: {e}")))?;
        Ok(Self {
            conn: RefCell::new(conn),
        })
    }

    /// Provides a mutable connection to the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, BotError>
    where
        F: FnOnce(&mut Connection) -> Result<T, BotError>,
    {
        let mut conn = self
            .conn
            .try_borrow_mut()
            .map_err(|_| BotError::Db("connection already in use".into()))?;
        f(&mut conn)
    }

    /// Create the `lots` table if it does not exist yet.
    pub fn init(&self) -> Result<(), BotError> {
        self.with_conn(|conn| init_schema(conn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_database_keeps_schema_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lots.db");

        Database::open(&path).unwrap().init().unwrap();

        let db = Database::open(&path).unwrap();
        let n: i64 = db
            .with_conn(|conn| {
                conn.query_row("select count(*) from lots", [], |r| r.get(0))
                    .map_err(BotError::from)
            })
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn nested_use_is_an_error_not_a_panic() {
        let db = Database::open_in_memory().unwrap();
        let res = db.with_conn(|_| db.with_conn(|_| Ok(())));
        assert!(matches!(res, Err(BotError::Db(_))));
    }

    #[test]
    fn missing_directory_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let res = Database::open(dir.path().join("nope").join("lots.db"));
        assert!(matches!(res, Err(BotError::Db(_))));
    }
}
