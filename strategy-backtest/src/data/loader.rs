use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use common::{BacktestError, Bar, Result};
use tracing::debug;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Load bars from a CSV file with columns `timestamp, open, high, low, close, volume`
pub fn load_csv(path: &Path) -> Result<Vec<Bar>> {
    let file = File::open(path).map_err(|e| BacktestError::DataLoadError(e.to_string()))?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let mut bars = Vec::new();
    for (row, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| BacktestError::CsvError(e.to_string()))?;
        if record.len() < 6 {
            debug!(row, columns = record.len(), "skipping short CSV row");
            continue;
        }

        bars.push(Bar {
            timestamp: parse_timestamp(&record[0])?,
            open: parse_field(&record[1], "open", row)?,
            high: parse_field(&record[2], "high", row)?,
            low: parse_field(&record[3], "low", row)?,
            close: parse_field(&record[4], "close", row)?,
            volume: parse_field(&record[5], "volume", row)?,
        });
    }

    Ok(bars)
}

/// Load bars from a JSON array
pub fn load_json(path: &Path) -> Result<Vec<Bar>> {
    let file = File::open(path).map_err(|e| BacktestError::DataLoadError(e.to_string()))?;
    let bars: Vec<Bar> = serde_json::from_reader(BufReader::new(file))?;
    Ok(bars)
}

fn parse_field(raw: &str, column: &str, row: usize) -> Result<f64> {
    raw.parse()
        .map_err(|_| BacktestError::CsvError(format!("Invalid {} on row {}: {:?}", column, row + 1, raw)))
}

/// Parse RFC 3339, common date/time layouts, or Unix seconds
pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }

    for fmt in DATE_FORMATS {
        if let Some(dt) = NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }

    if let Ok(ts) = s.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp(ts, 0) {
            return Ok(dt);
        }
    }

    Err(BacktestError::CsvError(format!(
        "Unable to parse timestamp: {}",
        s
    )))
}
