/// Upper, middle (SMA) and lower bands; `None` until the first full window
#[derive(Debug, Clone, Default)]
pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Bollinger Bands using the population standard deviation of each window
pub fn calculate_bollinger_bands(prices: &[f64], period: usize, std_dev: f64) -> BollingerBands {
    let n = prices.len();
    let mut bb = BollingerBands {
        upper: vec![None; n],
        middle: vec![None; n],
        lower: vec![None; n],
    };

    if period == 0 || n < period {
        return bb;
    }

    for (offset, window) in prices.windows(period).enumerate() {
        let i = offset + period - 1;
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period as f64;
        let width = variance.sqrt() * std_dev;

        bb.middle[i] = Some(mean);
        bb.upper[i] = Some(mean + width);
        bb.lower[i] = Some(mean - width);
    }

    bb
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bollinger_bands_basic() {
        let prices = vec![
            22.27, 22.19, 22.08, 22.17, 22.18, 22.13, 22.23, 22.43, 22.24, 22.29, 22.15, 22.39,
            22.38, 22.61, 23.36, 24.05, 23.75, 23.83, 23.95, 23.63,
        ];
        let bb = calculate_bollinger_bands(&prices, 20, 2.0);

        assert_eq!(bb.middle.len(), prices.len());
        assert!(bb.middle[18].is_none());

        let middle = bb.middle[19].unwrap();
        assert!(bb.upper[19].unwrap() > middle);
        assert!(bb.lower[19].unwrap() < middle);
    }

    #[test]
    fn test_flat_prices_collapse_bands() {
        let bb = calculate_bollinger_bands(&[10.0; 5], 3, 2.0);
        assert_relative_eq!(bb.upper[4].unwrap(), 10.0);
        assert_relative_eq!(bb.lower[4].unwrap(), 10.0);
    }
}
