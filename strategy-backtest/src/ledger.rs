use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::{BacktestError, Bar, Position, Result, Side, Trade};
use tracing::debug;

pub const STOP_LOSS_REASON: &str = "Stop loss";
pub const TAKE_PROFIT_REASON: &str = "Take profit";
pub const END_OF_BACKTEST_REASON: &str = "end of backtest";

/// Cash, open positions (at most one per symbol) and the closed-trade ledger
/// of a single run
#[derive(Debug)]
pub struct PositionLedger {
    cash: f64,
    max_positions: usize,
    positions: BTreeMap<String, Position>,
    trades: Vec<Trade>,
    next_trade_id: u64,
}

impl PositionLedger {
    pub fn new(initial_capital: f64, max_positions: usize) -> Self {
        Self {
            cash: initial_capital,
            max_positions,
            positions: BTreeMap::new(),
            trades: Vec::new(),
            next_trade_id: 1,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Cash plus every open position at its last mark
    pub fn equity(&self) -> f64 {
        self.cash + self.positions_value()
    }

    pub fn positions_value(&self) -> f64 {
        self.positions.values().map(Position::market_value).sum()
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn open_count(&self) -> usize {
        self.positions.len()
    }

    /// Flat on `symbol` and below the global position limit
    pub fn can_open(&self, symbol: &str) -> bool {
        !self.has_position(symbol) && self.open_count() < self.max_positions
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }

    pub fn mark_to_market(&mut self, symbol: &str, price: f64) {
        if let Some(pos) = self.positions.get_mut(symbol) {
            pos.current_price = price;
        }
    }

    /// Take a position, paying `quantity * entry_price + entry_commission` from
    /// cash. For a short that amount is held as collateral.
    pub fn open_position(&mut self, position: Position) -> Result<()> {
        if self.has_position(&position.symbol) {
            return Err(BacktestError::PositionAlreadyExists {
                symbol: position.symbol,
            });
        }
        if self.open_count() >= self.max_positions {
            return Err(BacktestError::MaxPositionsReached {
                max_positions: self.max_positions,
            });
        }

        let cost = position.quantity * position.entry_price + position.entry_commission;
        if cost > self.cash {
            return Err(BacktestError::InsufficientCash {
                required: cost,
                available: self.cash,
            });
        }

        self.cash -= cost;
        debug!(
            symbol = %position.symbol,
            side = ?position.side,
            quantity = position.quantity,
            price = position.entry_price,
            reason = %position.entry_reason,
            "opened position"
        );
        self.positions.insert(position.symbol.clone(), position);
        Ok(())
    }

    /// Close the position on `symbol` at `price`, appending the round trip to
    /// the trade ledger
    pub fn close_position(
        &mut self,
        symbol: &str,
        price: f64,
        timestamp: DateTime<Utc>,
        reason: &str,
        commission: f64,
    ) -> Option<&Trade> {
        let mut position = self.positions.remove(symbol)?;
        position.current_price = price;

        let proceeds = position.market_value() - commission;
        let cost_basis = position.quantity * position.entry_price + position.entry_commission;
        let profit = proceeds - cost_basis;
        let notional = position.quantity * position.entry_price;

        self.cash += proceeds;

        let trade = Trade {
            id: self.next_trade_id,
            symbol: position.symbol,
            side: position.side,
            entry_date: position.entry_date,
            exit_date: timestamp,
            entry_price: position.entry_price,
            exit_price: price,
            quantity: position.quantity,
            commission: position.entry_commission + commission,
            profit,
            profit_pct: if notional > 0.0 {
                profit / notional * 100.0
            } else {
                0.0
            },
            holding_period_days: (timestamp - position.entry_date).num_days(),
            entry_reason: position.entry_reason,
            exit_reason: reason.to_string(),
        };
        self.next_trade_id += 1;

        debug!(
            id = trade.id,
            symbol = %trade.symbol,
            price,
            profit = trade.profit,
            reason,
            "closed position"
        );
        self.trades.push(trade);
        self.trades.last()
    }

    /// Stop-loss or take-profit breach on `bar`, returning the fill price and
    /// exit reason. The stop is checked first, so a bar breaching both exits
    /// at the stop.
    pub fn check_risk_exit(&self, symbol: &str, bar: &Bar) -> Option<(f64, &'static str)> {
        let pos = self.positions.get(symbol)?;

        let stop_hit = |stop: f64| match pos.side {
            Side::Long => bar.low <= stop,
            Side::Short => bar.high >= stop,
        };
        let target_hit = |target: f64| match pos.side {
            Side::Long => bar.high >= target,
            Side::Short => bar.low <= target,
        };

        if let Some(stop) = pos.stop_loss_price.filter(|s| stop_hit(*s)) {
            return Some((stop, STOP_LOSS_REASON));
        }
        if let Some(target) = pos.take_profit_price.filter(|t| target_hit(*t)) {
            return Some((target, TAKE_PROFIT_REASON));
        }
        None
    }
}
