use std::time::Instant;

use chrono::{DateTime, Utc};
use common::{
    BacktestError, BacktestResult, BacktestSettings, Bar, EquityPoint, Position, Result, Strategy,
};
use rayon::prelude::*;
use tracing::{debug, info, info_span};

use crate::data::validate_series;
use crate::indicators::{IndicatorProvider, IndicatorSeries, StandardIndicators};
use crate::ledger::{PositionLedger, END_OF_BACKTEST_REASON};
use crate::metrics::PerformanceCalculator;
use crate::risk::RiskManager;
use crate::signals::RuleEvaluator;

/// Bar-by-bar strategy replay
pub struct BacktestEngine<P = StandardIndicators> {
    provider: P,
}

impl BacktestEngine<StandardIndicators> {
    /// Engine backed by the built-in indicator set with default periods
    pub fn standard() -> Self {
        Self::new(StandardIndicators::default())
    }
}

impl<P: IndicatorProvider> BacktestEngine<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Replay `bars` under `strategy`.
    ///
    /// Inputs are validated up front; once the replay starts it cannot fail.
    /// Bars after `settings.end_date` are ignored. Bars before
    /// `settings.start_date` only feed indicators, as does the warm-up prefix.
    pub fn run(
        &self,
        bars: &[Bar],
        strategy: &Strategy,
        settings: &BacktestSettings,
    ) -> Result<BacktestResult> {
        settings.validate()?;
        strategy.validate()?;
        validate_series(bars)?;

        let end = bars.partition_point(|b| b.date() <= settings.end_date);
        let bars = &bars[..end];
        if bars.is_empty() {
            return Err(BacktestError::EmptySeries);
        }
        let first_in_range = bars.partition_point(|b| b.date() < settings.start_date);
        let start = first_in_range.max(settings.warmup_bars);
        if start >= bars.len() {
            return Err(BacktestError::InsufficientData {
                required: start + 1,
                actual: bars.len(),
            });
        }

        let symbol = strategy.symbol();
        let span = info_span!(
            "backtest",
            strategy = %strategy.name,
            symbol,
            bars = bars.len() - start
        );
        let _guard = span.enter();
        let started = Instant::now();

        let mut ctx = RunContext::new(strategy, settings);
        let last = bars.len() - 1;
        for i in start..bars.len() {
            let history = &bars[..=i];
            let indicators = self.provider.compute_indicators(history);
            ctx.step(&indicators, history, i == last);
        }

        let result = ctx.finish(&bars[start], &bars[last]);
        info!(
            trades = result.trades.len(),
            final_equity = result.final_equity,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backtest complete"
        );
        Ok(result)
    }

    /// Independent runs of several strategies over the same bars, in
    /// parallel. Results keep the order of `strategies`.
    pub fn run_batch(
        &self,
        bars: &[Bar],
        strategies: &[Strategy],
        settings: &BacktestSettings,
    ) -> Vec<Result<BacktestResult>> {
        strategies
            .par_iter()
            .map(|strategy| self.run(bars, strategy, settings))
            .collect()
    }
}

/// Mutable state owned by one run
struct RunContext<'a> {
    strategy: &'a Strategy,
    settings: &'a BacktestSettings,
    ledger: PositionLedger,
    equity_curve: Vec<EquityPoint>,
    high_water_mark: f64,
}

impl<'a> RunContext<'a> {
    fn new(strategy: &'a Strategy, settings: &'a BacktestSettings) -> Self {
        Self {
            strategy,
            settings,
            ledger: PositionLedger::new(
                settings.initial_capital,
                strategy.risk_management.max_positions,
            ),
            equity_curve: Vec::new(),
            high_water_mark: settings.initial_capital,
        }
    }

    /// Exits, then entries, then valuation. The final bar takes no entries;
    /// anything still open is closed at its close before the equity point is
    /// recorded.
    fn step(&mut self, indicators: &IndicatorSeries, history: &[Bar], is_last: bool) {
        let Some(bar) = history.last() else {
            return;
        };
        let strategy = self.strategy;
        let symbol = strategy.symbol();

        let exited = self.process_exits(indicators, history, bar);
        if !exited && !is_last {
            self.process_entries(indicators, history, bar);
        }

        self.ledger.mark_to_market(symbol, bar.close);
        if is_last && self.ledger.has_position(symbol) {
            self.close(bar.close, bar.timestamp, END_OF_BACKTEST_REASON);
        }
        self.record_equity(bar.timestamp);
    }

    /// Returns true when a position was closed on this bar
    fn process_exits(&mut self, indicators: &IndicatorSeries, history: &[Bar], bar: &Bar) -> bool {
        let strategy = self.strategy;
        let symbol = strategy.symbol();
        if !self.ledger.has_position(symbol) {
            return false;
        }

        if let Some((price, reason)) = self.ledger.check_risk_exit(symbol, bar) {
            self.close(price, bar.timestamp, reason);
            return true;
        }

        let evaluation = RuleEvaluator::evaluate_rule_set(&strategy.exit_rules, indicators, history);
        if evaluation.should_trigger {
            self.close(bar.close, bar.timestamp, &evaluation.reason);
            return true;
        }
        false
    }

    fn process_entries(&mut self, indicators: &IndicatorSeries, history: &[Bar], bar: &Bar) {
        let strategy = self.strategy;
        let symbol = strategy.symbol();
        if !self.ledger.can_open(symbol) {
            return;
        }

        let evaluation = RuleEvaluator::evaluate_rule_set(&strategy.entry_rules, indicators, history);
        if !evaluation.should_trigger {
            return;
        }

        let risk = &strategy.risk_management;
        let settings = self.settings;
        let price = bar.close;

        let amount = RiskManager::position_size(
            self.ledger.equity(),
            risk.position_size_pct,
            self.ledger.cash(),
        );
        let quantity = RiskManager::quantity(amount, price);
        if quantity < 1.0 {
            debug!(amount, price, "entry skipped: size below one unit");
            return;
        }
        let commission = RiskManager::commission(
            quantity * price,
            settings.commission_fixed,
            settings.commission_pct,
        );
        let cash = self.ledger.cash();
        if quantity * price + commission > cash {
            debug!(quantity, price, commission, cash, "entry skipped: insufficient cash");
            return;
        }

        let side = strategy.direction;
        let position = Position {
            symbol: symbol.to_string(),
            side,
            quantity,
            entry_price: price,
            entry_date: bar.timestamp,
            entry_commission: commission,
            entry_reason: evaluation.reason,
            stop_loss_price: RiskManager::stop_loss_price(price, risk.stop_loss_pct, side),
            take_profit_price: RiskManager::take_profit_price(price, risk.take_profit_pct, side),
            current_price: price,
        };

        if let Err(err) = self.ledger.open_position(position) {
            debug!(%err, "entry skipped");
        }
    }

    fn close(&mut self, price: f64, timestamp: DateTime<Utc>, reason: &str) {
        let strategy = self.strategy;
        let symbol = strategy.symbol();
        let Some(position) = self.ledger.position(symbol) else {
            return;
        };
        let commission = RiskManager::commission(
            position.quantity * price,
            self.settings.commission_fixed,
            self.settings.commission_pct,
        );
        self.ledger
            .close_position(symbol, price, timestamp, reason, commission);
    }

    fn record_equity(&mut self, date: DateTime<Utc>) {
        let equity = self.ledger.equity();
        self.high_water_mark = self.high_water_mark.max(equity);
        let drawdown_pct = if self.high_water_mark > 0.0 {
            ((self.high_water_mark - equity) / self.high_water_mark * 100.0).max(0.0)
        } else {
            0.0
        };
        self.equity_curve.push(EquityPoint {
            date,
            equity,
            drawdown_pct,
        });
    }

    fn finish(self, first: &Bar, last: &Bar) -> BacktestResult {
        let final_equity = self.ledger.equity();
        let trades = self.ledger.into_trades();
        let performance = PerformanceCalculator::summarize(&trades, &self.equity_curve, self.settings);
        let monthly_returns = PerformanceCalculator::monthly_returns(&self.equity_curve);

        BacktestResult {
            strategy_name: self.strategy.name.clone(),
            symbol: self.strategy.symbol().to_string(),
            trades,
            performance,
            equity_curve: self.equity_curve,
            monthly_returns,
            start_date: first.date(),
            end_date: last.date(),
            initial_capital: self.settings.initial_capital,
            final_equity,
        }
    }
}
