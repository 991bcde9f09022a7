//! Trade outcome simulation.
//!
//! Each signal is replayed against the bars that follow it, up to
//! `max_bars` of them. Within a bar the exits are checked stop-loss first,
//! then target 2, then target 1, so a bar that spans both the stop and a
//! target resolves as a loss. A trade closes in full at its first exit; there
//! is no scaling out at target 1. Trades are independent of one another and
//! may overlap in time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::domain::ohlcv::Bar;
use crate::domain::pips::price_to_pips;
use crate::domain::signal::{Direction, Signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    StopLoss,
    Target1,
    Target2,
    TimeStop,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "STOP_LOSS"),
            ExitReason::Target1 => write!(f, "TP1"),
            ExitReason::Target2 => write!(f, "TP2"),
            ExitReason::TimeStop => write!(f, "TIME_STOP"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub signal: Signal,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub exit_time: DateTime<Utc>,
    /// Direction-adjusted (exit - entry) in pips.
    pub pips: f64,
    pub win: bool,
    pub bars_held: usize,
}

impl Trade {
    fn close(
        signal: &Signal,
        exit_price: f64,
        exit_reason: ExitReason,
        exit_time: DateTime<Utc>,
        bars_held: usize,
    ) -> Self {
        let pips = signal.direction.sign() * price_to_pips(exit_price - signal.entry_price);
        Trade {
            signal: *signal,
            exit_price,
            exit_reason,
            exit_time,
            pips,
            win: pips > 0.0,
            bars_held,
        }
    }
}

/// Flat trade-log row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeLogEntry {
    pub entry_time: String,
    pub direction: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub exit_reason: String,
    pub pips: f64,
    pub win: bool,
    pub bars_in_trade: usize,
    pub level_type: String,
}

impl From<&Trade> for TradeLogEntry {
    fn from(trade: &Trade) -> Self {
        TradeLogEntry {
            entry_time: trade.signal.timestamp.to_rfc3339(),
            direction: trade.signal.direction.to_string(),
            entry_price: trade.signal.entry_price,
            exit_price: trade.exit_price,
            exit_reason: trade.exit_reason.to_string(),
            pips: trade.pips,
            win: trade.win,
            bars_in_trade: trade.bars_held,
            level_type: trade.signal.level_type.to_string(),
        }
    }
}

/// First exit hit within `bar`, in priority order stop, target 2, target 1.
pub fn check_exit(signal: &Signal, bar: &Bar) -> Option<(f64, ExitReason)> {
    let (stop_hit, tp2_hit, tp1_hit) = match signal.direction {
        Direction::Long => (
            bar.low <= signal.stop_loss,
            bar.high >= signal.target2,
            bar.high >= signal.target1,
        ),
        Direction::Short => (
            bar.high >= signal.stop_loss,
            bar.low <= signal.target2,
            bar.low <= signal.target1,
        ),
    };

    if stop_hit {
        Some((signal.stop_loss, ExitReason::StopLoss))
    } else if tp2_hit {
        Some((signal.target2, ExitReason::Target2))
    } else if tp1_hit {
        Some((signal.target1, ExitReason::Target1))
    } else {
        None
    }
}

/// Replays `signal` over `bars` (the same sequence it was detected on).
///
/// Without a price exit inside the horizon the trade is closed at the close of
/// the last bar examined. A signal on the final bar has nothing to replay and
/// closes flat at its entry after zero bars.
pub fn simulate_trade(bars: &[Bar], signal: &Signal, max_bars: usize) -> Trade {
    let forward = bars.get(signal.bar_index + 1..).unwrap_or(&[]);

    let mut last: Option<&Bar> = None;
    for (offset, bar) in forward.iter().take(max_bars).enumerate() {
        if let Some((price, reason)) = check_exit(signal, bar) {
            return Trade::close(signal, price, reason, bar.timestamp, offset + 1);
        }
        last = Some(bar);
    }

    let held = forward.len().min(max_bars);
    match last {
        Some(bar) => Trade::close(signal, bar.close, ExitReason::TimeStop, bar.timestamp, held),
        None => Trade::close(
            signal,
            signal.entry_price,
            ExitReason::TimeStop,
            signal.timestamp,
            0,
        ),
    }
}

pub fn simulate_trades(bars: &[Bar], signals: &[Signal], max_bars: usize) -> Vec<Trade> {
    signals
        .iter()
        .map(|signal| simulate_trade(bars, signal, max_bars))
        .collect()
}
