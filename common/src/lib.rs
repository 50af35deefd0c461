pub mod config;
pub mod error;
pub mod indicator;
pub mod strategy;
pub mod types;

pub use config::{BacktestSettings, IndicatorConfig, RunConfig, DEFAULT_WARMUP_BARS};
pub use error::{BacktestError, Result};
pub use indicator::IndicatorKind;
pub use strategy::{RiskManagement, RuleCondition, Strategy, StrategyRule, DEFAULT_SYMBOL};
pub use types::*;
