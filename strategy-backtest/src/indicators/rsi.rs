/// Relative Strength Index with Wilder's smoothing.
///
/// The first value lands at index `period`; earlier entries are `None`.
/// A window with no losses reads 100, one with no gains reads 0.
pub fn calculate_rsi(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = prices.len();
    let mut rsi = vec![None; n];
    if period == 0 || n < period + 1 {
        return rsi;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let delta = prices[i] - prices[i - 1];
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss -= delta;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    rsi[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    let alpha = 1.0 / period as f64;
    for i in (period + 1)..n {
        let delta = prices[i] - prices[i - 1];
        avg_gain = avg_gain * (1.0 - alpha) + delta.max(0.0) * alpha;
        avg_loss = avg_loss * (1.0 - alpha) + (-delta).max(0.0) * alpha;
        rsi[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    rsi
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_basic() {
        let prices = vec![44.0, 44.25, 44.5, 43.75, 44.5, 44.25, 44.0, 43.5, 44.25, 44.5];
        let rsi = calculate_rsi(&prices, 2);

        assert_eq!(rsi.len(), prices.len());
        assert!(rsi[0].is_none());
        assert!(rsi[1].is_none());
        for val in rsi.iter().flatten() {
            assert!((0.0..=100.0).contains(val));
        }
    }

    #[test]
    fn test_rsi_all_gains() {
        let rsi = calculate_rsi(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0], 2);
        assert_eq!(rsi[5], Some(100.0));
    }

    #[test]
    fn test_rsi_all_losses() {
        let rsi = calculate_rsi(&[15.0, 14.0, 13.0, 12.0, 11.0, 10.0], 2);
        assert_eq!(rsi[5], Some(0.0));
    }

    #[test]
    fn test_rsi_flat_is_neutral() {
        let rsi = calculate_rsi(&[5.0; 6], 3);
        assert_eq!(rsi[5], Some(50.0));
    }
}
