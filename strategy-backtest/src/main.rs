use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;

use strategy_backtest::{
    generate_synthetic_bars, load_file, BacktestEngine, BacktestResult, BacktestSettings,
    IndicatorConfig, RunConfig, StandardIndicators, Strategy,
};

const DEFAULT_CAPITAL: f64 = 100_000.0;

#[derive(Parser, Debug)]
#[command(name = "strategy-backtest")]
#[command(version = "0.1.0")]
#[command(about = "Rule-based strategy backtester", long_about = None)]
struct Args {
    /// Run configuration (JSON/TOML) with settings and strategies.
    /// Without it, an RSI mean-reversion sample runs over the whole series.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Data file path (CSV/JSON). If not provided, uses synthetic data.
    #[arg(short = 'f', long)]
    data_file: Option<PathBuf>,

    /// Number of synthetic bars
    #[arg(short, long, default_value = "500")]
    days: usize,

    /// Initial price for synthetic data
    #[arg(long, default_value = "50.0")]
    initial_price: f64,

    /// Seed for synthetic data
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Initial capital, overriding the config
    #[arg(long)]
    capital: Option<f64>,

    /// Output format (json, text)
    #[arg(short, long, default_value = "json")]
    output: String,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,

    /// Log filter, e.g. `info` or `strategy_backtest=debug`
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let bars = if let Some(path) = &args.data_file {
        info!(path = %path.display(), "loading price data");
        load_file(path).with_context(|| format!("failed to load {}", path.display()))?
    } else {
        info!(
            days = args.days,
            initial_price = args.initial_price,
            seed = args.seed,
            "generating synthetic price data"
        );
        generate_synthetic_bars(args.days, args.initial_price, args.seed)
    };

    let (mut settings, strategies, indicators) = match &args.config {
        Some(path) => {
            let config = RunConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            (config.settings, config.strategies, config.indicators)
        }
        None => (
            BacktestSettings::covering(&bars, DEFAULT_CAPITAL)?,
            vec![Strategy::rsi_mean_reversion()],
            IndicatorConfig::default(),
        ),
    };
    if let Some(capital) = args.capital {
        settings.initial_capital = capital;
    }

    let engine = BacktestEngine::new(StandardIndicators::new(indicators));
    let results = engine
        .run_batch(&bars, &strategies, &settings)
        .into_iter()
        .collect::<strategy_backtest::Result<Vec<_>>>()?;

    match args.output.as_str() {
        "json" => print_json(&results, args.pretty)?,
        "text" => results.iter().for_each(print_text_report),
        other => {
            return Err(anyhow!("unknown output format: {}", other));
        }
    }

    Ok(())
}

fn init_logging(filter: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| anyhow!("invalid log filter: {err}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn print_json(results: &[BacktestResult], pretty: bool) -> Result<()> {
    let json = match (results, pretty) {
        ([single], true) => serde_json::to_string_pretty(single)?,
        ([single], false) => serde_json::to_string(single)?,
        (all, true) => serde_json::to_string_pretty(all)?,
        (all, false) => serde_json::to_string(all)?,
    };
    println!("{}", json);
    Ok(())
}

fn print_text_report(result: &BacktestResult) {
    let perf = &result.performance;

    println!();
    println!("================================================================");
    println!("  BACKTEST REPORT - {} ({})", result.strategy_name, result.symbol);
    println!("================================================================");
    println!();
    println!("  Period: {} to {}", result.start_date, result.end_date);
    println!("  Duration: {} bars", result.equity_curve.len());
    println!();
    println!("----------------------------------------------------------------");
    println!("  CAPITAL");
    println!("----------------------------------------------------------------");
    println!("  Initial Capital:  ${:>12.2}", result.initial_capital);
    println!("  Final Equity:     ${:>12.2}", result.final_equity);
    println!(
        "  Total Return:     ${:>12.2} ({:+.2}%)",
        perf.total_return, perf.total_return_pct
    );
    println!("  Annualized:       {:>12.2}%", perf.annualized_return_pct);
    println!();
    println!("----------------------------------------------------------------");
    println!("  RISK METRICS");
    println!("----------------------------------------------------------------");
    println!("  Volatility (Ann): {:>12.2}%", perf.volatility_pct);
    println!("  Sharpe Ratio:     {:>12.3}", perf.sharpe_ratio);
    println!("  Sortino Ratio:    {:>12.3}", perf.sortino_ratio);
    println!("  Max Drawdown:     {:>12.2}%", perf.max_drawdown_pct);
    println!();
    println!("----------------------------------------------------------------");
    println!("  TRADE STATISTICS");
    println!("----------------------------------------------------------------");
    println!("  Total Trades:     {:>12}", perf.total_trades);
    println!("  Winning Trades:   {:>12}", perf.winning_trades);
    println!("  Losing Trades:    {:>12}", perf.losing_trades);
    println!("  Win Rate:         {:>12.1}%", perf.win_rate);
    println!("  Profit Factor:    {:>12.3}", perf.profit_factor);
    println!("  Avg Win:          ${:>12.2}", perf.average_win);
    println!("  Avg Loss:         ${:>12.2}", perf.average_loss);
    println!("  Largest Win:      ${:>12.2}", perf.largest_win);
    println!("  Largest Loss:     ${:>12.2}", perf.largest_loss);
    println!("  Expectancy:       ${:>12.2}", perf.expectancy);
    println!("  Avg Holding:      {:>12.1} days", perf.average_holding_days);
    println!("  Commission Paid:  ${:>12.2}", perf.total_commission);
    println!();

    if !result.monthly_returns.is_empty() {
        println!("----------------------------------------------------------------");
        println!("  MONTHLY RETURNS");
        println!("----------------------------------------------------------------");
        for month in &result.monthly_returns {
            println!("  {}:          {:>+12.2}%", month.month, month.return_pct);
        }
        println!();
    }
    println!("================================================================");

    if !result.trades.is_empty() {
        println!();
        println!("  RECENT TRADES (last 5)");
        println!("----------------------------------------------------------------");
        for trade in result.trades.iter().rev().take(5) {
            println!(
                "  #{} {} -> {} | P&L: ${:+.2} ({:+.1}%) | {} days | {}",
                trade.id,
                trade.entry_date.format("%Y-%m-%d"),
                trade.exit_date.format("%Y-%m-%d"),
                trade.profit,
                trade.profit_pct,
                trade.holding_period_days,
                trade.exit_reason
            );
        }
        println!();
    }
}
