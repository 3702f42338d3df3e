//! SQLite storage for airport taxi demand.
//!
//! Holds the observed ride counts, the current forecast and user feedback,
//! and implements the storage seams of `atd-series` so the forecast
//! pipeline can run directly against a database.
//!
//! # Usage
//!
//! ```rust
//! use atd_db::Database;
//!
//! let db = Database::new().unwrap();
//! db.load_rides("date,time,category_1,category_2,category_3,category_4\n2024-06-01,10:00:00,4,2,0,1\n").unwrap();
//! let rows = db.query_rides_since("2024-06-01").unwrap();
//! assert_eq!(rows.len(), 1);
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.

pub mod schema;
mod loader;
mod queries;
pub mod models;

use rusqlite::Connection;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// SQLite database handle.
///
/// Cheaply cloneable (via `Rc`); clones share one connection. The
/// connection is closed when the last clone is dropped.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    pub fn new() -> anyhow::Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Open (or create) a database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("[ATD] db: opening {}", path.display());
        Self::init(Connection::open(path)?)
    }

    fn init(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}
