pub mod loader;
pub mod synthetic;

pub use loader::{load_csv, load_json};
pub use synthetic::{bars_from_closes, generate_synthetic_bars};

use std::path::Path;

use common::{BacktestError, Bar, Result};

/// Load bars from file, detecting format from extension
pub fn load_file(path: &Path) -> Result<Vec<Bar>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let bars = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        _ => {
            return Err(BacktestError::DataLoadError(format!(
                "Unsupported file format: {}",
                ext
            )))
        }
    };
    validate_series(&bars)?;
    Ok(bars)
}

/// Check the shape of a price series before a run.
///
/// Requires a non-empty series, strictly increasing timestamps, finite
/// non-negative values and `low <= open, close <= high` on every bar.
pub fn validate_series(bars: &[Bar]) -> Result<()> {
    if bars.is_empty() {
        return Err(BacktestError::EmptySeries);
    }

    for (index, bar) in bars.iter().enumerate() {
        let values = [bar.open, bar.high, bar.low, bar.close, bar.volume];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(BacktestError::InvalidBar {
                index,
                reason: "negative or non-finite value".to_string(),
            });
        }
        if bar.low > bar.open.min(bar.close) || bar.high < bar.open.max(bar.close) {
            return Err(BacktestError::InvalidBar {
                index,
                reason: format!(
                    "open {} / close {} outside low {} .. high {}",
                    bar.open, bar.close, bar.low, bar.high
                ),
            });
        }
        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(BacktestError::NonMonotonicSeries { index });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_series_rejected() {
        assert!(matches!(validate_series(&[]), Err(BacktestError::EmptySeries)));
    }

    #[test]
    fn test_unordered_series_rejected() {
        let mut bars = bars_from_closes(&[10.0, 11.0, 12.0]);
        bars.swap(1, 2);
        assert!(matches!(
            validate_series(&bars),
            Err(BacktestError::NonMonotonicSeries { index: 1 })
        ));
    }

    #[test]
    fn test_ohlc_invariant_enforced() {
        let mut bars = bars_from_closes(&[10.0, 11.0]);
        bars[1].high = 10.5;
        assert!(matches!(
            validate_series(&bars),
            Err(BacktestError::InvalidBar { index: 1, .. })
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(load_file(Path::new("prices.parquet")).is_err());
    }
}
