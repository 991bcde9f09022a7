//! Strategy parameters.
//!
//! A single immutable [`StrategyConfig`] is built once per run and passed by
//! reference into every pipeline stage.

use chrono::{DateTime, Timelike, Utc};

/// Time-of-day window (UTC hours, half-open) during which entries are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl SessionWindow {
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        let hour = timestamp.hour();
        hour >= self.start_hour && hour < self.end_hour
    }
}

impl Default for SessionWindow {
    fn default() -> Self {
        SessionWindow {
            start_hour: 8,
            end_hour: 11,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub volume_multiplier: f64,
    pub volume_window: usize,
    pub min_wick_pips: f64,
    pub min_body_pips: f64,
    pub trend_length: usize,
    pub stop_loss_pips: f64,
    pub tp1_pips: f64,
    pub tp2_pips: f64,
    pub tolerance_pips: f64,
    pub max_bars: usize,
    /// Bars in one trading session; the prior-session extrema look back this far.
    pub session_bars: usize,
    /// Index of the first bar the signal scan considers.
    pub warmup_bars: usize,
    pub session: SessionWindow,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            volume_multiplier: 1.5,
            volume_window: 20,
            min_wick_pips: 8.0,
            min_body_pips: 5.0,
            trend_length: 20,
            stop_loss_pips: 15.0,
            tp1_pips: 20.0,
            tp2_pips: 30.0,
            tolerance_pips: 5.0,
            max_bars: 60,
            session_bars: 288,
            warmup_bars: 100,
            session: SessionWindow::default(),
        }
    }
}
