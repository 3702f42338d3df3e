//! SQL schema for the taxi demand database.
//!
//! Applied as a single batch whenever a database is opened, so opening an
//! existing file is a no-op thanks to `IF NOT EXISTS`.

/// Returns the full SQL schema as a single batch string.
///
/// - `rides` - passenger counts per recorded time, one column per category
/// - `forecast` - the current forecast, one value per 15 minute step
/// - `feedback` - free-text user feedback with an optional 1-5 rating
///
/// Dates and times are stored as `YYYY-MM-DD` and `HH:MM:SS` text so that
/// lexical order is chronological order.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS rides (
        date TEXT NOT NULL,
        time TEXT NOT NULL,
        category_1 INTEGER NOT NULL,
        category_2 INTEGER NOT NULL,
        category_3 INTEGER NOT NULL,
        category_4 INTEGER NOT NULL,
        PRIMARY KEY (date, time)
    );
    CREATE INDEX IF NOT EXISTS idx_rides_date ON rides(date);

    CREATE TABLE IF NOT EXISTS forecast (
        position INTEGER PRIMARY KEY,
        timestamp TEXT NOT NULL,
        value REAL NOT NULL
    );

    CREATE TABLE IF NOT EXISTS feedback (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at TEXT NOT NULL,
        rating INTEGER CHECK (rating IS NULL OR rating BETWEEN 1 AND 5),
        comment TEXT NOT NULL CHECK (length(comment) <= 256)
    );
    "#
}
