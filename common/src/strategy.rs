use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BacktestError, Result};
use crate::indicator::IndicatorKind;
use crate::types::Side;

/// Symbol used when a strategy does not name one
pub const DEFAULT_SYMBOL: &str = "DEFAULT";

/// Comparison applied by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCondition {
    GreaterThan,
    LessThan,
    Between,
    CrossesAbove,
    CrossesBelow,
}

impl RuleCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::Between => "between",
            Self::CrossesAbove => "crosses_above",
            Self::CrossesBelow => "crosses_below",
        }
    }

    pub fn is_crossing(self) -> bool {
        matches!(self, Self::CrossesAbove | Self::CrossesBelow)
    }
}

impl fmt::Display for RuleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One testable condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRule {
    pub indicator: String,
    pub condition: RuleCondition,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<f64>,
    /// Bars between the two samples of a crossing; 1 when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookback: Option<usize>,
}

impl StrategyRule {
    pub fn new(indicator: &str, condition: RuleCondition, value: f64) -> Self {
        Self {
            indicator: indicator.to_string(),
            condition,
            value,
            value2: None,
            lookback: None,
        }
    }

    pub fn greater_than(indicator: &str, value: f64) -> Self {
        Self::new(indicator, RuleCondition::GreaterThan, value)
    }

    pub fn less_than(indicator: &str, value: f64) -> Self {
        Self::new(indicator, RuleCondition::LessThan, value)
    }

    pub fn between(indicator: &str, low: f64, high: f64) -> Self {
        Self {
            value2: Some(high),
            ..Self::new(indicator, RuleCondition::Between, low)
        }
    }

    pub fn crosses_above(indicator: &str, value: f64) -> Self {
        Self::new(indicator, RuleCondition::CrossesAbove, value)
    }

    pub fn crosses_below(indicator: &str, value: f64) -> Self {
        Self::new(indicator, RuleCondition::CrossesBelow, value)
    }

    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = Some(lookback);
        self
    }

    pub fn lookback(&self) -> usize {
        self.lookback.unwrap_or(1)
    }

    pub fn indicator_kind(&self) -> Option<IndicatorKind> {
        IndicatorKind::parse(&self.indicator)
    }
}

impl fmt::Display for StrategyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.condition, self.value2) {
            (RuleCondition::Between, Some(upper)) => write!(
                f,
                "{} between {} and {}",
                self.indicator, self.value, upper
            ),
            (condition, _) => write!(f, "{} {} {}", self.indicator, condition, self.value),
        }
    }
}

/// Sizing and protective exits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskManagement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit_pct: Option<f64>,
    pub position_size_pct: f64,
    pub max_positions: usize,
}

impl Default for RiskManagement {
    fn default() -> Self {
        Self {
            stop_loss_pct: None,
            take_profit_pct: None,
            position_size_pct: 10.0,
            max_positions: 1,
        }
    }
}

/// A tradeable rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default)]
    pub direction: Side,
    pub entry_rules: Vec<StrategyRule>,
    pub exit_rules: Vec<StrategyRule>,
    #[serde(default)]
    pub risk_management: RiskManagement,
}

impl Strategy {
    pub fn new(name: &str, entry_rules: Vec<StrategyRule>, exit_rules: Vec<StrategyRule>) -> Self {
        Self {
            name: name.to_string(),
            symbol: None,
            direction: Side::Long,
            entry_rules,
            exit_rules,
            risk_management: RiskManagement::default(),
        }
    }

    /// Buy oversold RSI, sell overbought RSI
    pub fn rsi_mean_reversion() -> Self {
        Self::new(
            "RSI mean reversion",
            vec![StrategyRule::less_than("rsi", 30.0)],
            vec![StrategyRule::greater_than("rsi", 70.0)],
        )
        .with_stop_loss(5.0)
        .with_take_profit(10.0)
        .with_position_size(90.0)
    }

    pub fn symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or(DEFAULT_SYMBOL)
    }

    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbol = Some(symbol.to_string());
        self
    }

    pub fn with_direction(mut self, direction: Side) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_stop_loss(mut self, pct: f64) -> Self {
        self.risk_management.stop_loss_pct = Some(pct);
        self
    }

    pub fn with_take_profit(mut self, pct: f64) -> Self {
        self.risk_management.take_profit_pct = Some(pct);
        self
    }

    pub fn with_position_size(mut self, pct: f64) -> Self {
        self.risk_management.position_size_pct = pct;
        self
    }

    pub fn with_max_positions(mut self, max_positions: usize) -> Self {
        self.risk_management.max_positions = max_positions;
        self
    }

    /// Reject shapes the engine cannot run.
    ///
    /// Unknown indicators and `between` rules without `value2` are only
    /// logged: such a rule never triggers, but the run proceeds.
    pub fn validate(&self) -> Result<()> {
        let risk = &self.risk_management;

        if !(risk.position_size_pct > 0.0 && risk.position_size_pct <= 100.0) {
            return Err(BacktestError::InvalidParameter(format!(
                "positionSizePct must be in (0, 100], got {}",
                risk.position_size_pct
            )));
        }
        if risk.max_positions < 1 {
            return Err(BacktestError::InvalidParameter(
                "maxPositions must be at least 1".to_string(),
            ));
        }
        if let Some(pct) = risk.stop_loss_pct {
            let upper = match self.direction {
                Side::Long => 100.0,
                Side::Short => f64::INFINITY,
            };
            if !(pct > 0.0 && pct < upper) {
                return Err(BacktestError::InvalidParameter(format!(
                    "stopLossPct out of range: {}",
                    pct
                )));
            }
        }
        if let Some(pct) = risk.take_profit_pct {
            let upper = match self.direction {
                Side::Long => f64::INFINITY,
                Side::Short => 100.0,
            };
            if !(pct > 0.0 && pct < upper) {
                return Err(BacktestError::InvalidParameter(format!(
                    "takeProfitPct out of range: {}",
                    pct
                )));
            }
        }

        Self::validate_rules("entryRules", &self.entry_rules)?;
        Self::validate_rules("exitRules", &self.exit_rules)?;
        Ok(())
    }

    fn validate_rules(rule_set: &str, rules: &[StrategyRule]) -> Result<()> {
        for (index, rule) in rules.iter().enumerate() {
            if rule.indicator_kind().is_none() {
                warn!(rule_set, index, indicator = %rule.indicator, "unknown indicator, rule will never be satisfied");
            }

            if rule.condition == RuleCondition::Between {
                match rule.value2 {
                    None => {
                        warn!(rule_set, index, "between rule without value2, rule will never be satisfied");
                    }
                    Some(upper) if rule.value > upper => {
                        return Err(BacktestError::InvalidRule {
                            rule_set: rule_set.to_string(),
                            index,
                            reason: format!("lower bound {} above upper bound {}", rule.value, upper),
                        });
                    }
                    Some(_) => {}
                }
            }

            if rule.lookback == Some(0) {
                return Err(BacktestError::InvalidRule {
                    rule_set: rule_set.to_string(),
                    index,
                    reason: "lookback must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }
}
