pub mod data;
pub mod engine;
pub mod indicators;
pub mod ledger;
pub mod metrics;
pub mod risk;
pub mod signals;

pub use data::{bars_from_closes, generate_synthetic_bars, load_file, validate_series};
pub use engine::BacktestEngine;
pub use indicators::{IndicatorProvider, IndicatorSeries, StandardIndicators};
pub use ledger::PositionLedger;
pub use metrics::PerformanceCalculator;
pub use risk::RiskManager;
pub use signals::{RuleEvaluation, RuleEvaluator, RuleSetEvaluation};

// Re-export common types
pub use common::{
    BacktestError, BacktestResult, BacktestSettings, Bar, EquityPoint, IndicatorConfig,
    IndicatorKind, MonthlyReturn, PerformanceReport, Position, Result, RiskManagement,
    RuleCondition, RunConfig, Side, Strategy, StrategyRule, Trade,
};
