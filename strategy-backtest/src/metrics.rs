use std::collections::BTreeMap;

use common::{BacktestSettings, EquityPoint, MonthlyReturn, PerformanceReport, Trade};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

/// Derives the summary report from the closed-trade ledger and equity curve.
///
/// Degenerate inputs (no trades, flat equity, no losses) produce `0` for the
/// affected metric, never `NaN` or infinity.
pub struct PerformanceCalculator;

impl PerformanceCalculator {
    pub fn summarize(
        trades: &[Trade],
        equity_curve: &[EquityPoint],
        settings: &BacktestSettings,
    ) -> PerformanceReport {
        let initial_capital = settings.initial_capital;
        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);
        let total_return = final_equity - initial_capital;
        let total_return_pct = total_return / initial_capital * 100.0;

        let daily_returns = Self::daily_returns(equity_curve);
        let (mean, std_dev) = mean_and_std_dev(&daily_returns);

        let stats = TradeStats::from_trades(trades);

        PerformanceReport {
            final_equity,
            total_return,
            total_return_pct,
            annualized_return_pct: Self::annualized_return_pct(total_return_pct, equity_curve.len()),
            volatility_pct: std_dev * TRADING_DAYS_PER_YEAR.sqrt() * 100.0,
            sharpe_ratio: Self::sharpe_ratio(mean, std_dev),
            sortino_ratio: Self::sortino_ratio(&daily_returns, mean),
            max_drawdown_pct: Self::max_drawdown_pct(equity_curve),
            total_trades: trades.len() as u32,
            winning_trades: stats.winning,
            losing_trades: stats.losing,
            win_rate: stats.win_rate(),
            profit_factor: stats.profit_factor(),
            average_win: stats.average_win(),
            average_loss: stats.average_loss(),
            largest_win: stats.largest_win,
            largest_loss: stats.largest_loss,
            expectancy: stats.expectancy(),
            average_holding_days: stats.average_holding_days(),
            total_commission: stats.total_commission,
        }
    }

    /// Linear scaling of the total return to 365 equity points. Ignores
    /// compounding.
    fn annualized_return_pct(total_return_pct: f64, points: usize) -> f64 {
        if points == 0 {
            return 0.0;
        }
        total_return_pct * (CALENDAR_DAYS_PER_YEAR / points as f64)
    }

    fn daily_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
        equity_curve
            .windows(2)
            .map(|w| {
                if w[0].equity != 0.0 {
                    (w[1].equity - w[0].equity) / w[0].equity
                } else {
                    0.0
                }
            })
            .collect()
    }

    fn sharpe_ratio(mean: f64, std_dev: f64) -> f64 {
        if std_dev == 0.0 {
            return 0.0;
        }
        mean / std_dev * TRADING_DAYS_PER_YEAR.sqrt()
    }

    /// Like Sharpe, but penalizing only returns below zero
    fn sortino_ratio(daily_returns: &[f64], mean: f64) -> f64 {
        if daily_returns.is_empty() {
            return 0.0;
        }
        let downside = daily_returns
            .iter()
            .map(|r| r.min(0.0).powi(2))
            .sum::<f64>()
            / daily_returns.len() as f64;
        let downside_dev = downside.sqrt();
        if downside_dev == 0.0 {
            return 0.0;
        }
        mean / downside_dev * TRADING_DAYS_PER_YEAR.sqrt()
    }

    fn max_drawdown_pct(equity_curve: &[EquityPoint]) -> f64 {
        equity_curve
            .iter()
            .map(|p| p.drawdown_pct)
            .fold(0.0, f64::max)
    }

    /// Percent change from the first to the last equity point of each
    /// calendar month, in chronological order
    pub fn monthly_returns(equity_curve: &[EquityPoint]) -> Vec<MonthlyReturn> {
        let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        for point in equity_curve {
            let key = point.date.format("%Y-%m").to_string();
            months
                .entry(key)
                .and_modify(|(_, last)| *last = point.equity)
                .or_insert((point.equity, point.equity));
        }

        months
            .into_iter()
            .map(|(month, (first, last))| MonthlyReturn {
                month,
                return_pct: if first != 0.0 {
                    (last - first) / first * 100.0
                } else {
                    0.0
                },
            })
            .collect()
    }
}

/// Population mean and standard deviation; `(0, 0)` for an empty slice
fn mean_and_std_dev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[derive(Debug, Default)]
struct TradeStats {
    count: u32,
    winning: u32,
    losing: u32,
    gross_profit: f64,
    gross_loss: f64,
    net_profit: f64,
    largest_win: f64,
    largest_loss: f64,
    total_holding_days: i64,
    total_commission: f64,
}

impl TradeStats {
    fn from_trades(trades: &[Trade]) -> Self {
        let mut stats = Self::default();
        for trade in trades {
            stats.count += 1;
            stats.net_profit += trade.profit;
            stats.total_holding_days += trade.holding_period_days;
            stats.total_commission += trade.commission;

            if trade.is_win() {
                stats.winning += 1;
                stats.gross_profit += trade.profit;
                stats.largest_win = stats.largest_win.max(trade.profit);
            } else if trade.is_loss() {
                stats.losing += 1;
                stats.gross_loss += trade.profit.abs();
                stats.largest_loss = stats.largest_loss.min(trade.profit);
            }
        }
        stats
    }

    fn win_rate(&self) -> f64 {
        ratio(self.winning as f64, self.count as f64) * 100.0
    }

    fn profit_factor(&self) -> f64 {
        ratio(self.gross_profit, self.gross_loss)
    }

    fn average_win(&self) -> f64 {
        ratio(self.gross_profit, self.winning as f64)
    }

    /// Signed, so never positive
    fn average_loss(&self) -> f64 {
        -ratio(self.gross_loss, self.losing as f64)
    }

    fn expectancy(&self) -> f64 {
        ratio(self.net_profit, self.count as f64)
    }

    fn average_holding_days(&self) -> f64 {
        ratio(self.total_holding_days as f64, self.count as f64)
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
