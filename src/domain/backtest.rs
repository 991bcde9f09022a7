//! Backtest pipeline.
//!
//! bars → indicators → signals → trades → metrics, one sequential pass.

use tracing::{debug, info};

use crate::domain::config_validation::validate_strategy_config;
use crate::domain::error::BacktestError;
use crate::domain::indicator::compute_indicators;
use crate::domain::input_validation::validate_bars;
use crate::domain::metrics::MetricsSummary;
use crate::domain::ohlcv::Bar;
use crate::domain::signal::detect_signals;
use crate::domain::simulation::{simulate_trades, Trade};
use crate::domain::strategy::StrategyConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub bar_count: usize,
    /// In signal (bar) order.
    pub trades: Vec<Trade>,
    pub metrics: MetricsSummary,
}

/// Runs the full pipeline. Configuration and input are validated first; a
/// run that finds no signals returns an empty trade list with zeroed metrics.
pub fn run_backtest(bars: &[Bar], config: &StrategyConfig) -> Result<BacktestResult, BacktestError> {
    validate_strategy_config(config)?;
    validate_bars(bars, config.warmup_bars)?;

    let indicator_bars = compute_indicators(bars, config);

    let signals = detect_signals(&indicator_bars, config);
    info!(bars = bars.len(), signals = signals.len(), "signal scan complete");
    for signal in &signals {
        debug!(
            time = %signal.timestamp,
            direction = %signal.direction,
            entry = signal.entry_price,
            level = %signal.level_type,
            "entry signal"
        );
    }

    let trades = simulate_trades(bars, &signals, config.max_bars);
    let metrics = MetricsSummary::compute(&trades);
    info!(
        trades = metrics.total_trades,
        win_rate = metrics.win_rate,
        total_pips = metrics.total_pips,
        "simulation complete"
    );

    Ok(BacktestResult {
        bar_count: bars.len(),
        trades,
        metrics,
    })
}
