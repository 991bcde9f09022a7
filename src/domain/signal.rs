//! Entry signal detection.
//!
//! Each bar C inside the session window (with its predecessor P) is checked
//! against five conditions:
//! 1. Location: C.close near a round 00/50 level or the prior-session high/low
//! 2. Volume: P carries the volume spike
//! 3. Rejection: P has a long wick on the side of the trade
//! 4. Confirmation: C has a strong body and closes beyond P's range
//! 5. Trend: trend slope and C.close agree with the direction
//!
//! Long is evaluated first and wins the bar when satisfied; Short is only
//! considered when Long fails. At most one signal per bar.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::domain::indicator::IndicatorBar;
use crate::domain::pips::{pips_to_price, price_to_pips};
use crate::domain::strategy::StrategyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for Long, -1 for Short.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Which key level the entry was taken at. Round numbers take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelType {
    RoundNumber,
    PriorExtreme,
}

impl fmt::Display for LevelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelType::RoundNumber => write!(f, "Round"),
            LevelType::PriorExtreme => write!(f, "Prev Day"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target1: f64,
    pub target2: f64,
    pub level_type: LevelType,
    pub bar_index: usize,
}

impl Signal {
    /// Places stop and targets symmetrically around `entry_price` for `direction`.
    pub fn new(
        timestamp: DateTime<Utc>,
        direction: Direction,
        entry_price: f64,
        level_type: LevelType,
        bar_index: usize,
        config: &StrategyConfig,
    ) -> Self {
        let sign = direction.sign();
        Signal {
            timestamp,
            direction,
            entry_price,
            stop_loss: entry_price - sign * pips_to_price(config.stop_loss_pips),
            target1: entry_price + sign * pips_to_price(config.tp1_pips),
            target2: entry_price + sign * pips_to_price(config.tp2_pips),
            level_type,
            bar_index,
        }
    }
}

/// True when `price` sits within `tolerance_pips` of a 00 or 50 pip level.
pub fn is_near_round_number(price: f64, tolerance_pips: f64) -> bool {
    let offset = price_to_pips(price).rem_euclid(50.0);
    offset.min(50.0 - offset) <= tolerance_pips
}

/// Strictly inside `tolerance_pips` of `level`.
fn is_near_level(price: f64, level: Option<f64>, tolerance_pips: f64) -> bool {
    level.is_some_and(|l| price_to_pips((price - l).abs()) < tolerance_pips)
}

/// Condition 1. Returns the matched level, round numbers first.
fn locate_level(current: &IndicatorBar, config: &StrategyConfig) -> Option<LevelType> {
    let close = current.bar.close;
    if is_near_round_number(close, config.tolerance_pips) {
        return Some(LevelType::RoundNumber);
    }
    let at_prior_high = is_near_level(close, current.prior_session_high, config.tolerance_pips);
    let at_prior_low = is_near_level(close, current.prior_session_low, config.tolerance_pips);
    (at_prior_high || at_prior_low).then_some(LevelType::PriorExtreme)
}

/// Conditions 3-5 for one direction; the shared body check is done by the caller.
fn setup_holds(
    direction: Direction,
    current: &IndicatorBar,
    prev: &IndicatorBar,
    trend: f64,
    slope: f64,
    config: &StrategyConfig,
) -> bool {
    let close = current.bar.close;
    match direction {
        Direction::Long => {
            prev.lower_wick_pips() >= config.min_wick_pips
                && current.bar.is_bullish()
                && close > prev.bar.high
                && slope > 0.0
                && close > trend
        }
        Direction::Short => {
            prev.upper_wick_pips() >= config.min_wick_pips
                && current.bar.is_bearish()
                && close < prev.bar.low
                && slope < 0.0
                && close < trend
        }
    }
}

/// Evaluates bar `index` against its predecessor. Bars whose required
/// indicators are still warming up yield no signal.
pub fn evaluate_bar(bars: &[IndicatorBar], index: usize, config: &StrategyConfig) -> Option<Signal> {
    let current = bars.get(index)?;
    let prev = bars.get(index.checked_sub(1)?)?;

    if !config.session.contains(current.bar.timestamp) {
        return None;
    }

    let level_type = locate_level(current, config)?;

    if !prev.volume_spike? {
        return None;
    }

    let trend = current.trend?;
    let slope = current.trend_slope?;

    if current.body_pips() < config.min_body_pips {
        return None;
    }

    [Direction::Long, Direction::Short]
        .into_iter()
        .find(|&d| setup_holds(d, current, prev, trend, slope, config))
        .map(|direction| {
            Signal::new(
                current.bar.timestamp,
                direction,
                current.bar.close,
                level_type,
                index,
                config,
            )
        })
}

/// Scans from the first warmed-up bar to the end, in bar order.
pub fn detect_signals(bars: &[IndicatorBar], config: &StrategyConfig) -> Vec<Signal> {
    let start = config.warmup_bars.max(1);
    (start..bars.len())
        .filter_map(|i| evaluate_bar(bars, i, config))
        .collect()
}
