use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    #[serde(alias = "date")]
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Trade direction. A strategy trades a single direction for the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Long,
    Short,
}

/// Currently open holding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub entry_price: f64,
    pub entry_date: DateTime<Utc>,
    pub entry_commission: f64,
    pub entry_reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit_price: Option<f64>,
    pub current_price: f64,
}

impl Position {
    /// Value the position contributes to equity at `current_price`.
    ///
    /// A short is carried as its collateral (`quantity * entry_price`) plus
    /// unrealized P&L, so both sides reduce to cash when closed at the mark.
    pub fn market_value(&self) -> f64 {
        match self.side {
            Side::Long => self.quantity * self.current_price,
            Side::Short => self.quantity * (2.0 * self.entry_price - self.current_price),
        }
    }

    pub fn unrealized_pnl(&self) -> f64 {
        let value_diff = self.current_price - self.entry_price;
        match self.side {
            Side::Long => value_diff * self.quantity,
            Side::Short => -value_diff * self.quantity,
        }
    }

    pub fn unrealized_pnl_pct(&self) -> f64 {
        let cost = self.entry_price * self.quantity;
        if cost == 0.0 {
            0.0
        } else {
            (self.unrealized_pnl() / cost) * 100.0
        }
    }
}

/// Closed round-trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: u64,
    pub symbol: String,
    pub side: Side,
    pub entry_date: DateTime<Utc>,
    pub exit_date: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    /// Entry plus exit commission
    pub commission: f64,
    /// Net of all commission
    pub profit: f64,
    pub profit_pct: f64,
    pub holding_period_days: i64,
    pub entry_reason: String,
    pub exit_reason: String,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.profit > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.profit < 0.0
    }
}

/// One bar's portfolio valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPoint {
    pub date: DateTime<Utc>,
    pub equity: f64,
    /// Decline from the running high-water mark, in percent
    pub drawdown_pct: f64,
}

/// Return of one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReturn {
    /// `YYYY-MM`
    pub month: String,
    pub return_pct: f64,
}

/// Summary statistics of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    // Returns
    pub final_equity: f64,
    pub total_return: f64,
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    // Risk
    pub volatility_pct: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown_pct: f64,
    // Trade statistics
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub average_win: f64,
    pub average_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub expectancy: f64,
    pub average_holding_days: f64,
    pub total_commission: f64,
}

/// Backtest result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub strategy_name: String,
    pub symbol: String,
    pub trades: Vec<Trade>,
    pub performance: PerformanceReport,
    pub equity_curve: Vec<EquityPoint>,
    pub monthly_returns: Vec<MonthlyReturn>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub final_equity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn position(side: Side, current_price: f64) -> Position {
        Position {
            symbol: "TEST".to_string(),
            side,
            quantity: 10.0,
            entry_price: 100.0,
            entry_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            entry_commission: 0.0,
            entry_reason: String::new(),
            stop_loss_price: None,
            take_profit_price: None,
            current_price,
        }
    }

    #[test]
    fn test_long_position_value() {
        let pos = position(Side::Long, 110.0);
        assert_eq!(pos.market_value(), 1100.0);
        assert_eq!(pos.unrealized_pnl(), 100.0);
        assert_eq!(pos.unrealized_pnl_pct(), 10.0);
    }

    #[test]
    fn test_short_position_value() {
        let pos = position(Side::Short, 90.0);
        // collateral 1000 + pnl 100
        assert_eq!(pos.market_value(), 1100.0);
        assert_eq!(pos.unrealized_pnl(), 100.0);
    }

    #[test]
    fn test_bar_deserializes_date_alias() {
        let json = r#"{"date":"2024-03-01T00:00:00Z","open":1.0,"high":2.0,"low":0.5,"close":1.5,"volume":100.0}"#;
        let bar: Bar = serde_json::from_str(json).unwrap();
        assert_eq!(bar.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }
}
