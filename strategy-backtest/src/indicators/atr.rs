/// True range of one bar given the previous close
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let hl = high - low;
    let hc = (high - prev_close).abs();
    let lc = (low - prev_close).abs();
    hl.max(hc).max(lc)
}

/// Average True Range with Wilder's smoothing, seeded with the SMA of the
/// first `period` true ranges. Entries before the seed are `None`.
pub fn calculate_atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = highs.len().min(lows.len()).min(closes.len());
    let mut atr = vec![None; n];
    if period == 0 || n < period {
        return atr;
    }

    let tr: Vec<f64> = (0..n)
        .map(|i| {
            if i == 0 {
                highs[0] - lows[0]
            } else {
                true_range(highs[i], lows[i], closes[i - 1])
            }
        })
        .collect();

    let alpha = 1.0 / period as f64;
    let mut prev = tr[..period].iter().sum::<f64>() / period as f64;
    atr[period - 1] = Some(prev);

    for i in period..n {
        prev = prev * (1.0 - alpha) + tr[i] * alpha;
        atr[i] = Some(prev);
    }

    atr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atr_basic() {
        let highs = vec![48.7, 48.72, 48.9, 48.87, 48.82, 49.05, 49.2, 49.35, 49.92, 50.19];
        let lows = vec![47.79, 48.14, 48.39, 48.37, 48.24, 48.64, 48.94, 48.86, 49.5, 49.87];
        let closes = vec![48.16, 48.61, 48.75, 48.63, 48.74, 49.03, 49.07, 49.32, 49.91, 50.13];

        let atr = calculate_atr(&highs, &lows, &closes, 5);

        assert_eq!(atr.len(), highs.len());
        assert!(atr[3].is_none());
        for value in &atr[4..] {
            assert!(value.unwrap() > 0.0);
        }
    }

    #[test]
    fn test_true_range_gap_up() {
        // max(52-51, |52-48|, |51-48|)
        assert_eq!(true_range(52.0, 51.0, 48.0), 4.0);
    }
}
