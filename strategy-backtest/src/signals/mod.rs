pub mod evaluator;

pub use evaluator::{RuleEvaluation, RuleEvaluator, RuleSetEvaluation};
