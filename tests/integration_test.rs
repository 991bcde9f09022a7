//! End-to-end backtests over synthetic five-minute data.
//!
//! Tests cover:
//! - A planted long setup producing exactly one signal and its exits
//! - Exit priority and the max-bars horizon
//! - Session gating and empty results
//! - The fetch/run/report pipeline through mock ports

mod common;

use approx::assert_abs_diff_eq;
use common::*;
use sessiontrader::cli::{run_backtest_pipeline, RunSettings};
use sessiontrader::domain::backtest::run_backtest;
use sessiontrader::domain::error::BacktestError;
use sessiontrader::domain::metrics::{Assessment, MetricsSummary};
use sessiontrader::domain::signal::{Direction, LevelType};
use sessiontrader::domain::simulation::ExitReason;
use sessiontrader::domain::strategy::StrategyConfig;
use std::path::PathBuf;

mod long_setup {
    use super::*;

    #[test]
    fn single_signal_at_round_number() {
        let bars = long_signal_bars(200);
        let result = run_backtest(&bars, &StrategyConfig::default()).unwrap();

        assert_eq!(result.bar_count, 200);
        assert_eq!(result.trades.len(), 1);
        let signal = result.trades[0].signal;
        assert_eq!(signal.bar_index, SIGNAL_INDEX);
        assert_eq!(signal.direction, Direction::Long);
        assert_eq!(signal.level_type, LevelType::RoundNumber);
        assert_eq!(signal.timestamp, bars[SIGNAL_INDEX].timestamp);
        assert_abs_diff_eq!(signal.entry_price, 1.0350, epsilon = 1e-9);
        assert_abs_diff_eq!(signal.stop_loss, 1.0335, epsilon = 1e-9);
        assert_abs_diff_eq!(signal.target1, 1.0370, epsilon = 1e-9);
        assert_abs_diff_eq!(signal.target2, 1.0380, epsilon = 1e-9);
    }

    #[test]
    fn untouched_levels_close_at_horizon() {
        let bars = long_signal_bars(200);
        let result = run_backtest(&bars, &StrategyConfig::default()).unwrap();
        let trade = &result.trades[0];
        let last = &bars[SIGNAL_INDEX + 60];

        assert_eq!(trade.exit_reason, ExitReason::TimeStop);
        assert_eq!(trade.bars_held, 60);
        assert_eq!(trade.exit_time, last.timestamp);
        assert_abs_diff_eq!(trade.exit_price, last.close, epsilon = 1e-12);
        assert_abs_diff_eq!(trade.pips, -2.0, epsilon = 1e-6);
        assert!(!trade.win);
    }

    #[test]
    fn custom_horizon() {
        let bars = long_signal_bars(200);
        let config = StrategyConfig {
            max_bars: 12,
            ..Default::default()
        };
        let trade = &run_backtest(&bars, &config).unwrap().trades[0];
        assert_eq!(trade.exit_reason, ExitReason::TimeStop);
        assert_eq!(trade.bars_held, 12);
        assert_eq!(trade.exit_time, bars[SIGNAL_INDEX + 12].timestamp);
    }

    #[test]
    fn second_target_hit() {
        let mut bars = long_signal_bars(200);
        bars[125].high = 1.0385;
        let trade = &run_backtest(&bars, &StrategyConfig::default()).unwrap().trades[0];

        assert_eq!(trade.exit_reason, ExitReason::Target2);
        assert_eq!(trade.bars_held, 5);
        assert_abs_diff_eq!(trade.exit_price, 1.0380, epsilon = 1e-9);
        assert_abs_diff_eq!(trade.pips, 30.0, epsilon = 1e-6);
        assert!(trade.win);
    }

    #[test]
    fn first_target_hit() {
        let mut bars = long_signal_bars(200);
        bars[125].high = 1.0372;
        let trade = &run_backtest(&bars, &StrategyConfig::default()).unwrap().trades[0];

        assert_eq!(trade.exit_reason, ExitReason::Target1);
        assert_abs_diff_eq!(trade.pips, 20.0, epsilon = 1e-6);
    }

    #[test]
    fn stop_takes_priority_within_one_bar() {
        let mut bars = long_signal_bars(200);
        bars[123].low = 1.0330;
        bars[123].high = 1.0385;
        let trade = &run_backtest(&bars, &StrategyConfig::default()).unwrap().trades[0];

        assert_eq!(trade.exit_reason, ExitReason::StopLoss);
        assert_eq!(trade.bars_held, 3);
        assert_abs_diff_eq!(trade.exit_price, 1.0335, epsilon = 1e-9);
        assert_abs_diff_eq!(trade.pips, -15.0, epsilon = 1e-6);
        assert!(!trade.win);
    }

    #[test]
    fn short_forward_window_closes_at_last_bar() {
        let bars = long_signal_bars(131);
        let trade = &run_backtest(&bars, &StrategyConfig::default()).unwrap().trades[0];

        assert_eq!(trade.exit_reason, ExitReason::TimeStop);
        assert_eq!(trade.bars_held, 10);
        assert_eq!(trade.exit_time, bars[130].timestamp);
    }

    #[test]
    fn signal_on_final_bar_is_flat() {
        let bars = long_signal_bars(SIGNAL_INDEX + 1);
        let trade = &run_backtest(&bars, &StrategyConfig::default()).unwrap().trades[0];

        assert_eq!(trade.exit_reason, ExitReason::TimeStop);
        assert_eq!(trade.bars_held, 0);
        assert_eq!(trade.pips, 0.0);
        assert!(!trade.win);
    }

    #[test]
    fn repeated_runs_identical() {
        let bars = long_signal_bars(200);
        let config = StrategyConfig::default();
        let first = run_backtest(&bars, &config).unwrap();
        let second = run_backtest(&bars, &config).unwrap();
        assert_eq!(first, second);
    }
}

mod short_setup {
    use super::*;

    /// Falling drift with a shooting star at 119 and a bearish close on 1.0350 at 120.
    fn short_signal_bars(count: usize) -> Vec<Bar> {
        let mut bars: Vec<Bar> = (0..count)
            .map(|i| {
                let close = 1.0370 - 0.00001 * i as f64;
                make_bar(i, close + 0.00001, close + 0.00005, close - 0.00005, close, 100.0)
            })
            .collect();
        bars[119] = make_bar(119, 1.0358, 1.0370, 1.0356, 1.0357, 1000.0);
        bars[120] = make_bar(120, 1.0357, 1.0358, 1.0349, 1.0350, 100.0);
        bars
    }

    #[test]
    fn mirrored_signal() {
        let result = run_backtest(&short_signal_bars(200), &StrategyConfig::default()).unwrap();

        assert_eq!(result.trades.len(), 1);
        let signal = result.trades[0].signal;
        assert_eq!(signal.direction, Direction::Short);
        assert_eq!(signal.bar_index, 120);
        assert_abs_diff_eq!(signal.stop_loss, 1.0365, epsilon = 1e-9);
        assert_abs_diff_eq!(signal.target1, 1.0330, epsilon = 1e-9);
        assert_abs_diff_eq!(signal.target2, 1.0320, epsilon = 1e-9);
    }
}

mod no_signals {
    use super::*;

    #[test]
    fn setup_outside_session_ignored() {
        // index 140 is 11:40 UTC
        let bars = long_setup_at(200, 140);
        let result = run_backtest(&bars, &StrategyConfig::default()).unwrap();
        assert!(result.trades.is_empty());
    }

    #[test]
    fn widened_session_picks_it_up() {
        let bars = long_setup_at(200, 140);
        let mut config = StrategyConfig::default();
        config.session.end_hour = 12;
        let result = run_backtest(&bars, &config).unwrap();
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].signal.bar_index, 140);
    }

    #[test]
    fn quiet_market_gives_zero_metrics() {
        let result = run_backtest(&drift_bars(300), &StrategyConfig::default()).unwrap();

        assert!(result.trades.is_empty());
        let m = &result.metrics;
        assert_eq!(m.total_trades, 0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.total_pips, 0.0);
        assert_eq!(m.profit_factor, 0.0);
        assert_eq!(m.avg_bars_in_trade, 0.0);
        assert_eq!(m.assessment(), Assessment::NeedsWork);
    }

    #[test]
    fn too_few_bars_rejected() {
        let err = run_backtest(&drift_bars(50), &StrategyConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            BacktestError::InsufficientData {
                bars: 50,
                minimum: 100
            }
        ));
    }

    #[test]
    fn out_of_order_bars_rejected() {
        let mut bars = drift_bars(150);
        bars.swap(10, 11);
        let err = run_backtest(&bars, &StrategyConfig::default()).unwrap_err();
        assert!(matches!(err, BacktestError::MalformedInput { row: 11, .. }));
    }
}

mod pipeline {
    use super::*;

    fn settings() -> RunSettings {
        RunSettings {
            symbol: "EURUSD".to_string(),
            data_dir: PathBuf::from("unused"),
            output_dir: PathBuf::from("results"),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 31),
        }
    }

    #[test]
    fn results_reach_report_port() {
        let data = MockDataPort::new().with_bars("EURUSD", long_signal_bars(200));
        let report = MockReportPort::new();

        let result =
            run_backtest_pipeline(&data, &report, &settings(), &StrategyConfig::default()).unwrap();
        assert_eq!(result.trades.len(), 1);

        let calls = report.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (ref reported, ref dir) = calls[0];
        assert_eq!(reported, &result);
        assert_eq!(dir, &PathBuf::from("results"));
        assert_eq!(reported.metrics, MetricsSummary::compute(&result.trades));
    }

    #[test]
    fn empty_result_still_reported() {
        let data = MockDataPort::new().with_bars("EURUSD", drift_bars(300));
        let report = MockReportPort::new();

        let result =
            run_backtest_pipeline(&data, &report, &settings(), &StrategyConfig::default()).unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(report.calls.borrow().len(), 1);
    }

    #[test]
    fn data_failure_propagates() {
        let data = MockDataPort::new().with_error("EURUSD", "feed offline");
        let report = MockReportPort::new();

        let err = run_backtest_pipeline(&data, &report, &settings(), &StrategyConfig::default())
            .unwrap_err();
        assert!(matches!(err, BacktestError::DataUnavailable { reason, .. } if reason == "feed offline"));
        assert!(report.calls.borrow().is_empty());
    }

    #[test]
    fn date_range_applied_before_run() {
        let data = MockDataPort::new().with_bars("EURUSD", long_signal_bars(200));
        let report = MockReportPort::new();
        let mut narrow = settings();
        narrow.start_date = date(2024, 2, 1);
        narrow.end_date = date(2024, 2, 29);

        let err = run_backtest_pipeline(&data, &report, &narrow, &StrategyConfig::default())
            .unwrap_err();
        assert!(matches!(err, BacktestError::DataUnavailable { .. }));
    }
}
