use super::ema::{calculate_ema, calculate_ema_of};

pub const MACD_FAST_PERIOD: usize = 12;
pub const MACD_SLOW_PERIOD: usize = 26;

#[derive(Debug, Clone, Default)]
pub struct Macd {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// MACD line (EMA12 - EMA26), its signal EMA and the histogram between them
pub fn calculate_macd(prices: &[f64], signal_period: usize) -> Macd {
    let fast = calculate_ema(prices, MACD_FAST_PERIOD);
    let slow = calculate_ema(prices, MACD_SLOW_PERIOD);

    let macd: Vec<Option<f64>> = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = calculate_ema_of(&macd, signal_period);
    let histogram = macd
        .iter()
        .zip(&signal)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    Macd {
        macd,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macd_warmup() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let macd = calculate_macd(&prices, 9);

        assert!(macd.macd[24].is_none());
        assert!(macd.macd[25].is_some());
        // signal needs 9 MACD values
        assert!(macd.signal[32].is_none());
        assert!(macd.signal[33].is_some());
        assert!(macd.histogram[33].is_some());
    }

    #[test]
    fn test_macd_positive_in_uptrend() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let macd = calculate_macd(&prices, 9);
        assert!(macd.macd[39].unwrap() > 0.0);
    }
}
