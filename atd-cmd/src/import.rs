//! `import` command: load ride and forecast CSV files into the database.

use crate::settings::Settings;
use atd_db::Database;
use std::fs;

pub fn run_import(config: Option<&str>, rides_csv: &str, forecast_csv: Option<&str>) -> anyhow::Result<()> {
    let settings = Settings::load(config)?;
    let db = Database::open(&settings.database)?;
    import_into(&db, rides_csv, forecast_csv)
}

/// Load the given files into `db`. The forecast file, when present,
/// replaces the stored forecast.
pub fn import_into(db: &Database, rides_csv: &str, forecast_csv: Option<&str>) -> anyhow::Result<()> {
    let rides = fs::read_to_string(rides_csv)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", rides_csv, e))?;
    let loaded = db.load_rides(&rides)?;

    if let Some(path) = forecast_csv {
        let forecast = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
        db.load_forecast(&forecast)?;
    }

    match db.query_ride_date_range()? {
        Some(range) => log::info!(
            "[ATD] import: {} rows imported, rides now cover {} to {}",
            loaded,
            range.first,
            range.last
        ),
        None => log::warn!("[ATD] import: rides table is still empty"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn imports_rides_and_forecast() {
        let rides = temp_file(
            "rides.csv",
            "date,time,category_1,category_2,category_3,category_4\n2024-06-01,10:00:00,1,2,3,4\n",
        );
        let forecast = temp_file("forecast.csv", "timestamp,value\n2024-06-01 10:15:00,7.5\n");

        let db = Database::new().unwrap();
        import_into(&db, rides.to_str().unwrap(), forecast.to_str()).unwrap();
        let _ = fs::remove_file(&rides);
        let _ = fs::remove_file(&forecast);

        assert_eq!(db.query_rides_since("2024-06-01").unwrap().len(), 1);
        assert_eq!(db.query_forecast_values().unwrap(), vec![7.5]);
    }

    #[test]
    fn missing_rides_file_fails() {
        let db = Database::new().unwrap();
        assert!(import_into(&db, "/nonexistent/rides.csv", None).is_err());
    }
}
