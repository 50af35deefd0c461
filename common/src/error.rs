use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Price series is empty")]
    EmptySeries,

    #[error("Insufficient data: need at least {required} bars, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Invalid date range: start {start} must be before end {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Price series not strictly increasing at bar {index}")]
    NonMonotonicSeries { index: usize },

    #[error("Malformed bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: String },

    #[error("Insufficient cash: need ${required:.2}, have ${available:.2}")]
    InsufficientCash { required: f64, available: f64 },

    #[error("Position already exists for {symbol}")]
    PositionAlreadyExists { symbol: String },

    #[error("Position limit of {max_positions} reached")]
    MaxPositionsReached { max_positions: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid rule #{index} in {rule_set}: {reason}")]
    InvalidRule {
        rule_set: String,
        index: usize,
        reason: String,
    },

    #[error("Data loading error: {0}")]
    DataLoadError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parse error: {0}")]
    CsvError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, BacktestError>;
