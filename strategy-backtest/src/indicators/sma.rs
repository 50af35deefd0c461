/// Simple moving average, aligned with `values`.
///
/// Entries before the first full window are `None`.
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || values.len() < period {
        return vec![None; values.len()];
    }

    let mut sma = Vec::with_capacity(values.len());
    sma.resize(period - 1, None);

    let mut window_sum: f64 = values[..period].iter().sum();
    sma.push(Some(window_sum / period as f64));
    for (entering, leaving) in values[period..].iter().zip(values) {
        window_sum += entering - leaving;
        sma.push(Some(window_sum / period as f64));
    }

    sma
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_window_means() {
        let sma = calculate_sma(&[2.0, 4.0, 6.0, 8.0, 10.0], 2);

        assert_eq!(sma, vec![None, Some(3.0), Some(5.0), Some(7.0), Some(9.0)]);
    }

    #[test]
    fn test_sma_of_flat_series_is_flat() {
        let sma = calculate_sma(&[100.0; 30], 20);

        assert_eq!(sma.len(), 30);
        assert_eq!(sma.iter().filter(|v| v.is_none()).count(), 19);
        assert!(sma[19..].iter().all(|v| *v == Some(100.0)));
    }

    #[test]
    fn test_sma_short_input_or_zero_period() {
        assert!(calculate_sma(&[1.0, 2.0, 3.0], 5).iter().all(Option::is_none));
        assert!(calculate_sma(&[1.0, 2.0], 0).iter().all(Option::is_none));
    }
}
