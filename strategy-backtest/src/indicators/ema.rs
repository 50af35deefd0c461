/// Exponential moving average seeded with the SMA of the first `period`
/// values. Entries before the seed are `None`.
pub fn calculate_ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let wrapped: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    calculate_ema_of(&wrapped, period)
}

/// EMA over a series that may itself still be warming up.
///
/// Leading `None` entries are skipped; the seed is the SMA of the first
/// `period` available values. A gap after the seed restarts nothing and the
/// output stays `None` at that index.
pub fn calculate_ema_of(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut ema = vec![None; n];
    if period == 0 {
        return ema;
    }

    let start = match values.iter().position(Option::is_some) {
        Some(start) => start,
        None => return ema,
    };
    let seed_end = start + period;
    if seed_end > n {
        return ema;
    }

    let seed_window: Option<Vec<f64>> = values[start..seed_end].iter().copied().collect();
    let Some(seed_window) = seed_window else {
        return ema;
    };

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut prev = seed_window.iter().sum::<f64>() / period as f64;
    ema[seed_end - 1] = Some(prev);

    for i in seed_end..n {
        if let Some(value) = values[i] {
            prev = (value - prev) * multiplier + prev;
            ema[i] = Some(prev);
        }
    }

    ema
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ema_seeded_with_sma() {
        let prices = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let ema = calculate_ema(&prices, 3);

        assert_eq!(ema.len(), prices.len());
        assert!(ema[1].is_none());
        assert_eq!(ema[2], Some(2.0));
        // (4 - 2) * 0.5 + 2
        assert_eq!(ema[3], Some(3.0));
    }

    #[test]
    fn test_ema_trends_towards_price() {
        let prices = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
        let ema: Vec<f64> = calculate_ema(&prices, 3).into_iter().flatten().collect();
        for w in ema.windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    fn test_ema_of_leading_gaps() {
        let values = vec![None, None, Some(2.0), Some(4.0), Some(6.0)];
        let ema = calculate_ema_of(&values, 2);
        assert!(ema[2].is_none());
        assert_eq!(ema[3], Some(3.0));
        assert_relative_eq!(ema[4].unwrap(), 5.0);
    }

    #[test]
    fn test_ema_empty() {
        assert!(calculate_ema(&[], 3).is_empty());
    }
}
