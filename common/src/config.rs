use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BacktestError, Result};
use crate::strategy::Strategy;
use crate::types::Bar;

/// Bars skipped before the first trading decision
pub const DEFAULT_WARMUP_BARS: usize = 50;

fn default_warmup_bars() -> usize {
    DEFAULT_WARMUP_BARS
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestSettings {
    pub initial_capital: f64,
    #[serde(default)]
    pub commission_fixed: f64,
    /// Percent of trade value, so `0.1` means 0.1%
    #[serde(default)]
    pub commission_pct: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_warmup_bars")]
    pub warmup_bars: usize,
}

impl BacktestSettings {
    pub fn new(initial_capital: f64, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            initial_capital,
            commission_fixed: 0.0,
            commission_pct: 0.0,
            start_date,
            end_date,
            warmup_bars: DEFAULT_WARMUP_BARS,
        }
    }

    /// Settings whose date range spans the whole series
    pub fn covering(bars: &[Bar], initial_capital: f64) -> Result<Self> {
        let (first, last) = match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(BacktestError::EmptySeries),
        };
        Ok(Self::new(initial_capital, first.date(), last.date()))
    }

    pub fn with_capital(mut self, capital: f64) -> Self {
        self.initial_capital = capital;
        self
    }

    pub fn with_commission(mut self, fixed: f64, pct: f64) -> Self {
        self.commission_fixed = fixed;
        self.commission_pct = pct;
        self
    }

    pub fn with_warmup(mut self, bars: usize) -> Self {
        self.warmup_bars = bars;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.initial_capital > 0.0) {
            return Err(BacktestError::InvalidParameter(format!(
                "initialCapital must be positive, got {}",
                self.initial_capital
            )));
        }
        if !(self.commission_fixed >= 0.0) || !(self.commission_pct >= 0.0) {
            return Err(BacktestError::InvalidParameter(
                "commission must be non-negative".to_string(),
            ));
        }
        if self.start_date >= self.end_date {
            return Err(BacktestError::InvalidDateRange {
                start: self.start_date.to_string(),
                end: self.end_date.to_string(),
            });
        }
        Ok(())
    }
}

/// Periods for the standard indicator provider.
///
/// The moving averages are fixed by their names (`sma20`, `ema12`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_signal_period: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub atr_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_signal_period: 9,
            bb_period: 20,
            bb_std_dev: 2.0,
            atr_period: 14,
        }
    }
}

/// Contents of a run configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RunConfig {
    pub settings: BacktestSettings,
    pub strategies: Vec<Strategy>,
    #[serde(default)]
    pub indicators: IndicatorConfig,
}

impl RunConfig {
    /// Load from `.json` or `.toml`, chosen by extension
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let config: RunConfig = match ext.as_str() {
            "json" => serde_json::from_str(&contents)?,
            "toml" => toml::from_str(&contents)?,
            _ => {
                return Err(BacktestError::DataLoadError(format!(
                    "Unsupported config format: {}",
                    ext
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;
        if self.strategies.is_empty() {
            return Err(BacktestError::InvalidParameter(
                "config defines no strategies".to_string(),
            ));
        }
        for strategy in &self.strategies {
            strategy.validate()?;
        }
        if self.indicators.rsi_period == 0
            || self.indicators.macd_signal_period == 0
            || self.indicators.bb_period == 0
            || self.indicators.atr_period == 0
        {
            return Err(BacktestError::InvalidParameter(
                "indicator periods must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::RuleCondition;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_settings_validation() {
        let settings = BacktestSettings::new(10_000.0, date(2024, 1, 1), date(2024, 12, 31));
        assert!(settings.validate().is_ok());

        let bad_range = BacktestSettings::new(10_000.0, date(2024, 1, 1), date(2024, 1, 1));
        assert!(matches!(
            bad_range.validate(),
            Err(BacktestError::InvalidDateRange { .. })
        ));

        let bad_capital = settings.clone().with_capital(0.0);
        assert!(bad_capital.validate().is_err());

        let bad_commission = settings.with_commission(-1.0, 0.0);
        assert!(bad_commission.validate().is_err());
    }

    #[test]
    fn test_toml_run_config() {
        let toml_src = r#"
            [settings]
            initialCapital = 25000.0
            commissionFixed = 1.0
            commissionPct = 0.1
            startDate = "2023-01-01"
            endDate = "2023-12-31"

            [indicators]
            rsiPeriod = 2

            [[strategies]]
            name = "rsi2"
            symbol = "TQQQ"

            [[strategies.entryRules]]
            indicator = "rsi"
            condition = "less_than"
            value = 10.0

            [[strategies.exitRules]]
            indicator = "rsi"
            condition = "greater_than"
            value = 90.0

            [strategies.riskManagement]
            stopLossPct = 5.0
            positionSizePct = 50.0
            maxPositions = 1
        "#;
        let config: RunConfig = toml::from_str(toml_src).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.settings.warmup_bars, DEFAULT_WARMUP_BARS);
        assert_eq!(config.indicators.rsi_period, 2);
        assert_eq!(config.indicators.bb_period, 20);
        assert_eq!(config.strategies[0].symbol(), "TQQQ");
        assert_eq!(
            config.strategies[0].entry_rules[0].condition,
            RuleCondition::LessThan
        );
    }

    #[test]
    fn test_empty_strategies_rejected() {
        let config = RunConfig {
            settings: BacktestSettings::new(1000.0, date(2024, 1, 1), date(2024, 2, 1)),
            strategies: vec![],
            indicators: IndicatorConfig::default(),
        };
        assert!(config.validate().is_err());
    }
}
