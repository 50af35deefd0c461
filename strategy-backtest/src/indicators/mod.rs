//! Technical indicators and the provider boundary the engine reads them
//! through.
//!
//! Every series is aligned with the bars it was computed from: one entry per
//! bar, `None` while the indicator is still warming up. The engine only ever
//! looks at the tail of a series.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use atr::{calculate_atr, true_range};
pub use bollinger::{calculate_bollinger_bands, BollingerBands};
pub use ema::{calculate_ema, calculate_ema_of};
pub use macd::{calculate_macd, Macd};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use common::{Bar, IndicatorConfig, IndicatorKind};

/// Computed indicator series for a prefix of the price series
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    pub sma20: Vec<Option<f64>>,
    pub sma50: Vec<Option<f64>>,
    pub ema12: Vec<Option<f64>>,
    pub ema26: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub macd_histogram: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_middle: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
}

impl IndicatorSeries {
    /// The series backing `kind`. Bar fields have none.
    pub fn series(&self, kind: IndicatorKind) -> Option<&[Option<f64>]> {
        let series = match kind {
            IndicatorKind::Sma20 => &self.sma20,
            IndicatorKind::Sma50 => &self.sma50,
            IndicatorKind::Ema12 => &self.ema12,
            IndicatorKind::Ema26 => &self.ema26,
            IndicatorKind::Rsi => &self.rsi,
            IndicatorKind::Macd => &self.macd,
            IndicatorKind::MacdSignal => &self.macd_signal,
            IndicatorKind::MacdHistogram => &self.macd_histogram,
            IndicatorKind::BbUpper => &self.bb_upper,
            IndicatorKind::BbMiddle => &self.bb_middle,
            IndicatorKind::BbLower => &self.bb_lower,
            IndicatorKind::Atr => &self.atr,
            IndicatorKind::Price
            | IndicatorKind::Open
            | IndicatorKind::High
            | IndicatorKind::Low
            | IndicatorKind::Volume => return None,
        };
        Some(series)
    }

    /// Value `bars_ago` entries before the end of the series
    pub fn value_at(&self, kind: IndicatorKind, bars_ago: usize) -> Option<f64> {
        let series = self.series(kind)?;
        let idx = series.len().checked_sub(bars_ago.checked_add(1)?)?;
        series[idx].filter(|v| v.is_finite())
    }

    pub fn latest(&self, kind: IndicatorKind) -> Option<f64> {
        self.value_at(kind, 0)
    }
}

/// Source of indicator values for the backtest driver.
///
/// Called once per replayed bar with every bar up to and including the
/// current one. Implementations must be deterministic for a run to be
/// reproducible.
pub trait IndicatorProvider: Send + Sync {
    fn compute_indicators(&self, bars: &[Bar]) -> IndicatorSeries;
}

/// Default provider computing the whole named set from closes, highs and lows
#[derive(Debug, Clone, Default)]
pub struct StandardIndicators {
    config: IndicatorConfig,
}

impl StandardIndicators {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }
}

impl IndicatorProvider for StandardIndicators {
    fn compute_indicators(&self, bars: &[Bar]) -> IndicatorSeries {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

        let macd = calculate_macd(&closes, self.config.macd_signal_period);
        let bb = calculate_bollinger_bands(&closes, self.config.bb_period, self.config.bb_std_dev);

        IndicatorSeries {
            sma20: calculate_sma(&closes, 20),
            sma50: calculate_sma(&closes, 50),
            ema12: calculate_ema(&closes, 12),
            ema26: calculate_ema(&closes, 26),
            rsi: calculate_rsi(&closes, self.config.rsi_period),
            macd: macd.macd,
            macd_signal: macd.signal,
            macd_histogram: macd.histogram,
            bb_upper: bb.upper,
            bb_middle: bb.middle,
            bb_lower: bb.lower,
            atr: calculate_atr(&highs, &lows, &closes, self.config.atr_period),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_synthetic_bars;

    #[test]
    fn test_standard_series_aligned_with_bars() {
        let bars = generate_synthetic_bars(80, 50.0, 7);
        let series = StandardIndicators::default().compute_indicators(&bars);

        for kind in IndicatorKind::ALL {
            if let Some(values) = series.series(kind) {
                assert_eq!(values.len(), bars.len(), "{kind}");
            }
        }
        assert!(series.latest(IndicatorKind::Sma50).is_some());
        assert!(series.latest(IndicatorKind::MacdSignal).is_some());
    }

    #[test]
    fn test_value_at_reads_from_end() {
        let series = IndicatorSeries {
            rsi: vec![None, Some(40.0), Some(45.0)],
            ..Default::default()
        };
        assert_eq!(series.latest(IndicatorKind::Rsi), Some(45.0));
        assert_eq!(series.value_at(IndicatorKind::Rsi, 1), Some(40.0));
        assert_eq!(series.value_at(IndicatorKind::Rsi, 2), None);
        assert_eq!(series.value_at(IndicatorKind::Rsi, 3), None);
        assert_eq!(series.value_at(IndicatorKind::Rsi, usize::MAX), None);
        assert_eq!(series.latest(IndicatorKind::Price), None);
    }

    #[test]
    fn test_warmup_gaps_are_none() {
        let bars = generate_synthetic_bars(10, 50.0, 1);
        let series = StandardIndicators::default().compute_indicators(&bars);
        assert_eq!(series.latest(IndicatorKind::Sma20), None);
        assert_eq!(series.latest(IndicatorKind::Macd), None);
    }
}
