use common::{Bar, IndicatorKind, RuleCondition, StrategyRule};
use tracing::trace;

use crate::indicators::IndicatorSeries;

pub const UNKNOWN_INDICATOR: &str = "unknown indicator";
pub const INSUFFICIENT_HISTORY: &str = "insufficient history";

/// Outcome of a single rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEvaluation {
    pub satisfied: bool,
    pub reason: String,
}

impl RuleEvaluation {
    fn satisfied(reason: String) -> Self {
        Self {
            satisfied: true,
            reason,
        }
    }

    fn unsatisfied(reason: impl Into<String>) -> Self {
        Self {
            satisfied: false,
            reason: reason.into(),
        }
    }
}

/// Outcome of an AND-combined rule set
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSetEvaluation {
    pub should_trigger: bool,
    pub reason: String,
}

/// Evaluates strategy rules against the bars seen so far and the indicators
/// computed over them. `bars.last()` is the current bar.
///
/// Nothing here fails: an unknown indicator, a missing value or too little
/// history leaves the rule unsatisfied with a reason saying why.
pub struct RuleEvaluator;

impl RuleEvaluator {
    pub fn evaluate_rule(
        rule: &StrategyRule,
        indicators: &IndicatorSeries,
        bars: &[Bar],
    ) -> RuleEvaluation {
        let Some(kind) = rule.indicator_kind() else {
            trace!(indicator = %rule.indicator, "unknown indicator");
            return RuleEvaluation::unsatisfied(UNKNOWN_INDICATOR);
        };

        let Some(current) = Self::resolve(kind, 0, indicators, bars) else {
            return RuleEvaluation::unsatisfied(format!("{} unavailable", rule.indicator));
        };

        let satisfied = match rule.condition {
            RuleCondition::GreaterThan => current > rule.value,
            RuleCondition::LessThan => current < rule.value,
            RuleCondition::Between => match rule.value2 {
                Some(upper) => rule.value <= current && current <= upper,
                None => return RuleEvaluation::unsatisfied("between requires value2"),
            },
            RuleCondition::CrossesAbove | RuleCondition::CrossesBelow => {
                let Some(previous) = Self::resolve(kind, rule.lookback(), indicators, bars) else {
                    return RuleEvaluation::unsatisfied(INSUFFICIENT_HISTORY);
                };
                if rule.condition == RuleCondition::CrossesAbove {
                    previous <= rule.value && current > rule.value
                } else {
                    previous >= rule.value && current < rule.value
                }
            }
        };

        let reason = format!("{} ({}={:.2})", rule, rule.indicator, current);
        trace!(%reason, satisfied, "rule evaluated");
        if satisfied {
            RuleEvaluation::satisfied(reason)
        } else {
            RuleEvaluation::unsatisfied(reason)
        }
    }

    /// All rules must hold. An empty set never triggers.
    pub fn evaluate_rule_set(
        rules: &[StrategyRule],
        indicators: &IndicatorSeries,
        bars: &[Bar],
    ) -> RuleSetEvaluation {
        if rules.is_empty() {
            return RuleSetEvaluation {
                should_trigger: false,
                reason: "no rules".to_string(),
            };
        }

        let mut reasons = Vec::with_capacity(rules.len());
        for rule in rules {
            let evaluation = Self::evaluate_rule(rule, indicators, bars);
            if !evaluation.satisfied {
                return RuleSetEvaluation {
                    should_trigger: false,
                    reason: evaluation.reason,
                };
            }
            reasons.push(evaluation.reason);
        }

        RuleSetEvaluation {
            should_trigger: true,
            reason: reasons.join(" AND "),
        }
    }

    fn resolve(
        kind: IndicatorKind,
        bars_ago: usize,
        indicators: &IndicatorSeries,
        bars: &[Bar],
    ) -> Option<f64> {
        if !kind.is_bar_field() {
            return indicators.value_at(kind, bars_ago);
        }

        let idx = bars.len().checked_sub(bars_ago.checked_add(1)?)?;
        let bar = &bars[idx];
        let value = match kind {
            IndicatorKind::Open => bar.open,
            IndicatorKind::High => bar.high,
            IndicatorKind::Low => bar.low,
            IndicatorKind::Volume => bar.volume,
            _ => bar.close,
        };
        Some(value)
    }
}
