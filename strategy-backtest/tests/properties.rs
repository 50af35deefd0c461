use proptest::prelude::*;
use strategy_backtest::{bars_from_closes, BacktestEngine, BacktestResult, BacktestSettings, StrategyRule};

/// Positive random walk, long enough to clear the warm-up
fn random_walk() -> impl Strategy<Value = Vec<f64>> {
    (
        10.0f64..500.0,
        prop::collection::vec(-0.04f64..0.04, 55..120),
    )
        .prop_map(|(start, steps)| {
            let mut price = start;
            steps
                .into_iter()
                .map(|step| {
                    price *= 1.0 + step;
                    price
                })
                .collect()
        })
}

fn swing_strategy(stop: Option<f64>, take: Option<f64>, size: f64) -> strategy_backtest::Strategy {
    let mut strategy = strategy_backtest::Strategy::new(
        "swing",
        vec![StrategyRule::less_than("rsi", 45.0)],
        vec![StrategyRule::greater_than("rsi", 55.0)],
    )
    .with_position_size(size);
    strategy.risk_management.stop_loss_pct = stop;
    strategy.risk_management.take_profit_pct = take;
    strategy
}

fn run(
    closes: &[f64],
    strategy: &strategy_backtest::Strategy,
    fixed: f64,
    pct: f64,
) -> BacktestResult {
    let bars = bars_from_closes(closes);
    let settings = BacktestSettings::covering(&bars, 10_000.0)
        .unwrap()
        .with_commission(fixed, pct);
    BacktestEngine::standard()
        .run(&bars, strategy, &settings)
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn equity_is_conserved(
        closes in random_walk(),
        stop in prop::option::of(1.0f64..20.0),
        take in prop::option::of(1.0f64..30.0),
        size in 5.0f64..100.0,
        fixed in 0.0f64..5.0,
        pct in 0.0f64..0.5,
    ) {
        let result = run(&closes, &swing_strategy(stop, take, size), fixed, pct);

        let profit: f64 = result.trades.iter().map(|t| t.profit).sum();
        let expected = result.initial_capital + profit;
        prop_assert!(
            (result.final_equity - expected).abs() < 1e-6,
            "final {} expected {}", result.final_equity, expected
        );
        prop_assert_eq!(
            Some(result.final_equity),
            result.equity_curve.last().map(|p| p.equity)
        );
    }

    #[test]
    fn drawdown_is_never_negative(closes in random_walk(), size in 5.0f64..100.0) {
        let result = run(&closes, &swing_strategy(Some(5.0), None, size), 1.0, 0.1);

        prop_assert!(result.equity_curve.iter().all(|p| p.drawdown_pct >= 0.0));
        prop_assert!(result.performance.max_drawdown_pct >= 0.0);
    }

    #[test]
    fn trade_counts_are_consistent(closes in random_walk(), size in 5.0f64..100.0) {
        let result = run(&closes, &swing_strategy(None, Some(8.0), size), 0.0, 0.0);
        let perf = &result.performance;

        prop_assert!((0.0..=100.0).contains(&perf.win_rate));
        prop_assert!(perf.winning_trades + perf.losing_trades <= perf.total_trades);
        prop_assert_eq!(perf.total_trades as usize, result.trades.len());
        prop_assert!(perf.profit_factor >= 0.0 && perf.profit_factor.is_finite());
        prop_assert!(perf.sharpe_ratio.is_finite());
    }

    #[test]
    fn runs_are_deterministic(closes in random_walk()) {
        let strategy = swing_strategy(Some(5.0), Some(10.0), 50.0);
        let first = run(&closes, &strategy, 1.0, 0.1);
        let second = run(&closes, &strategy, 1.0, 0.1);

        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        prop_assert_eq!(first, second);
    }

    #[test]
    fn trades_never_overlap(closes in random_walk()) {
        let result = run(&closes, &swing_strategy(None, None, 30.0), 0.0, 0.0);

        for pair in result.trades.windows(2) {
            prop_assert!(pair[0].exit_date < pair[1].entry_date);
        }
        for trade in &result.trades {
            prop_assert!(trade.entry_date <= trade.exit_date);
        }
    }
}
