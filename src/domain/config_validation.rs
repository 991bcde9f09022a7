//! Configuration validation.
//!
//! Strategy parameters are checked before any computation starts; the
//! `[backtest]` section is checked on the raw config before a run is wired up.

use crate::domain::error::BacktestError;
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_strategy_config(config: &StrategyConfig) -> Result<(), BacktestError> {
    validate_volume(config)?;
    validate_candle_thresholds(config)?;
    validate_exits(config)?;
    validate_windows(config)?;
    validate_session(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    validate_symbol(config)?;
    validate_dates(config)?;
    Ok(())
}

fn require_positive(key: &str, value: f64) -> Result<(), BacktestError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(BacktestError::invalid(
            "strategy",
            key,
            format!("{} must be positive", key),
        ));
    }
    Ok(())
}

fn require_at_least_one(key: &str, value: usize) -> Result<(), BacktestError> {
    if value < 1 {
        return Err(BacktestError::invalid(
            "strategy",
            key,
            format!("{} must be at least 1", key),
        ));
    }
    Ok(())
}

fn validate_volume(config: &StrategyConfig) -> Result<(), BacktestError> {
    require_positive("volume_multiplier", config.volume_multiplier)?;
    require_at_least_one("volume_window", config.volume_window)
}

fn validate_candle_thresholds(config: &StrategyConfig) -> Result<(), BacktestError> {
    require_positive("min_wick_pips", config.min_wick_pips)?;
    require_positive("min_body_pips", config.min_body_pips)?;
    require_positive("tolerance_pips", config.tolerance_pips)
}

fn validate_exits(config: &StrategyConfig) -> Result<(), BacktestError> {
    require_positive("stop_loss_pips", config.stop_loss_pips)?;
    require_positive("tp1_pips", config.tp1_pips)?;
    require_positive("tp2_pips", config.tp2_pips)?;
    require_at_least_one("max_bars", config.max_bars)
}

fn validate_windows(config: &StrategyConfig) -> Result<(), BacktestError> {
    require_at_least_one("trend_length", config.trend_length)?;
    require_at_least_one("session_bars", config.session_bars)?;
    require_at_least_one("warmup_bars", config.warmup_bars)
}

fn validate_session(config: &StrategyConfig) -> Result<(), BacktestError> {
    let window = config.session;
    if window.end_hour > 24 {
        return Err(BacktestError::invalid(
            "session",
            "end_hour",
            "end_hour must be at most 24",
        ));
    }
    if window.start_hour >= window.end_hour {
        return Err(BacktestError::invalid(
            "session",
            "start_hour",
            "start_hour must be before end_hour",
        ));
    }
    Ok(())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    match config.get_string("backtest", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(BacktestError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

/// Requires both `[backtest]` dates, with `start_date` before `end_date`.
pub fn validate_dates(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;

    if start_date >= end_date {
        return Err(BacktestError::invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

/// Reads a required `YYYY-MM-DD` date from the `[backtest]` section.
pub fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<NaiveDate, BacktestError> {
    match config.get_string("backtest", field) {
        None => Err(BacktestError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            BacktestError::invalid(
                "backtest",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}
