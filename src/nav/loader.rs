//! Load NAV history from CSV or scheme API JSON dumps

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::Reader;
use log::debug;

use super::scheme::SchemeHistory;
use super::series::{NavSeries, RawNavPoint};
use crate::error::Result;

/// Load a `date,nav` CSV file (dates DD-MM-YYYY, any row order)
pub fn load_nav_csv<P: AsRef<Path>>(path: P) -> Result<NavSeries> {
    let file = File::open(path.as_ref())?;
    let series = load_nav_from_reader(file)?;
    debug!("loaded {} NAV points from {}", series.len(), path.as_ref().display());
    Ok(series)
}

/// Load a `date,nav` CSV from any reader
pub fn load_nav_from_reader<R: Read>(reader: R) -> Result<NavSeries> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut raw = Vec::new();

    for result in csv_reader.deserialize() {
        let row: RawNavPoint = result?;
        raw.push(row);
    }

    NavSeries::from_raw(&raw)
}

/// Load a saved scheme history response
pub fn load_scheme_history<P: AsRef<Path>>(path: P) -> Result<SchemeHistory> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

/// Load NAV history from a path, choosing the format by extension
/// (`.json` scheme history, anything else CSV)
pub fn load_nav<P: AsRef<Path>>(path: P) -> Result<NavSeries> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_scheme_history(path)?.nav_series(),
        _ => load_nav_csv(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn test_load_from_reader() {
        let csv = "date,nav\n02-01-2024,10.5\n01-01-2024,10.0\n02-01-2024,11.0\n";
        let series = load_nav_from_reader(csv.as_bytes()).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.first().unwrap().nav, 10.0);
        assert_eq!(series.latest().unwrap().nav, 10.5);
    }

    #[test]
    fn test_load_rejects_bad_dates() {
        let csv = "date,nav\n2024/01/01,10.0\n";
        assert!(matches!(
            load_nav_from_reader(csv.as_bytes()),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_load_rejects_missing_columns() {
        let csv = "day,price\n01-01-2024,10.0\n";
        assert!(matches!(load_nav_from_reader(csv.as_bytes()), Err(EngineError::Csv(_))));
    }
}
