use chrono::{Duration, TimeZone, Utc};
use common::Bar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded random-walk daily bars starting 2020-01-01.
///
/// The same seed always yields the same series.
pub fn generate_synthetic_bars(days: usize, initial_price: f64, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(days);
    let start_date = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

    let daily_volatility = 0.02;
    let drift = 0.0003;
    let mut price = initial_price;

    for i in 0..days {
        let daily_return = drift + daily_volatility * rng.gen_range(-1.0..1.0);
        let close = (price * (1.0 + daily_return)).max(0.01);

        let intraday_range = price * rng.gen_range(0.005..0.03);
        let open = (price + rng.gen_range(-intraday_range / 2.0..intraday_range / 2.0)).max(0.01);
        let high = open.max(close) + rng.gen_range(0.0..intraday_range / 2.0);
        let low = (open.min(close) - rng.gen_range(0.0..intraday_range / 2.0)).max(0.0);

        let volume_multiplier = 1.0 + daily_return.abs() * 10.0;
        let volume = (1_000_000.0 * volume_multiplier * rng.gen_range(0.8..1.2)).round();

        bars.push(Bar {
            timestamp: start_date + Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
    }

    bars
}

/// Bars whose close follows `closes` exactly, one day apart.
///
/// Open is the previous close; high/low pad the body by 1%.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let start_date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: start_date + Duration::days(i as i64),
                open,
                high: open.max(close) * 1.01,
                low: open.min(close) * 0.99,
                close,
                volume: 1_000_000.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::validate_series;

    #[test]
    fn test_generate_synthetic_bars() {
        let bars = generate_synthetic_bars(250, 50.0, 42);

        assert_eq!(bars.len(), 250);
        assert!(validate_series(&bars).is_ok());
    }

    #[test]
    fn test_same_seed_same_series() {
        assert_eq!(
            generate_synthetic_bars(30, 50.0, 9),
            generate_synthetic_bars(30, 50.0, 9)
        );
        assert_ne!(
            generate_synthetic_bars(30, 50.0, 9),
            generate_synthetic_bars(30, 50.0, 10)
        );
    }

    #[test]
    fn test_bars_from_closes() {
        let bars = bars_from_closes(&[100.0, 98.0, 103.0]);
        assert!(validate_series(&bars).is_ok());
        assert_eq!(bars[2].open, 98.0);
        assert_eq!(bars[2].close, 103.0);
    }
}
