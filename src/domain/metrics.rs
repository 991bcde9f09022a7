//! Summary statistics over a set of simulated trades.

use serde::Serialize;
use std::fmt;

use super::simulation::Trade;

const TRADEABLE_WIN_RATE: f64 = 70.0;
const MARGINAL_WIN_RATE: f64 = 60.0;

/// Aggregate trade statistics. Every ratio is 0 when its denominator is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub total_trades: usize,
    pub winners: usize,
    pub losers: usize,
    /// Percentage, 0-100.
    pub win_rate: f64,
    pub total_pips: f64,
    pub avg_pips: f64,
    pub avg_win_pips: f64,
    pub avg_loss_pips: f64,
    /// Gross profit / gross loss; 0 when there is no loss, including the
    /// all-winners case.
    pub profit_factor: f64,
    pub avg_bars_in_trade: f64,
}

fn mean(sum: f64, count: usize) -> f64 {
    if count > 0 { sum / count as f64 } else { 0.0 }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

impl MetricsSummary {
    pub fn compute(trades: &[Trade]) -> Self {
        let total_trades = trades.len();

        let mut winners = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut losing_sum = 0.0_f64;
        let mut total_pips = 0.0_f64;
        let mut total_bars = 0usize;

        for trade in trades {
            total_pips += trade.pips;
            total_bars += trade.bars_held;
            if trade.win {
                winners += 1;
                gross_profit += trade.pips;
            } else {
                losing_sum += trade.pips;
            }
        }

        let losers = total_trades - winners;
        let gross_loss = losing_sum.abs();

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else {
            0.0
        };

        MetricsSummary {
            total_trades,
            winners,
            losers,
            win_rate: mean(winners as f64, total_trades) * 100.0,
            total_pips,
            avg_pips: mean(total_pips, total_trades),
            avg_win_pips: mean(gross_profit, winners),
            avg_loss_pips: mean(losing_sum, losers),
            profit_factor,
            avg_bars_in_trade: mean(total_bars as f64, total_trades),
        }
    }

    /// Presentation copy: ratios and pips to 2 decimals, bars to 1.
    pub fn rounded(&self) -> Self {
        MetricsSummary {
            win_rate: round_to(self.win_rate, 2),
            total_pips: round_to(self.total_pips, 2),
            avg_pips: round_to(self.avg_pips, 2),
            avg_win_pips: round_to(self.avg_win_pips, 2),
            avg_loss_pips: round_to(self.avg_loss_pips, 2),
            profit_factor: round_to(self.profit_factor, 2),
            avg_bars_in_trade: round_to(self.avg_bars_in_trade, 1),
            ..self.clone()
        }
    }

    /// Flat key/value view, in a stable order.
    pub fn to_key_values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("total_trades", self.total_trades as f64),
            ("winners", self.winners as f64),
            ("losers", self.losers as f64),
            ("win_rate", self.win_rate),
            ("total_pips", self.total_pips),
            ("avg_pips", self.avg_pips),
            ("avg_win_pips", self.avg_win_pips),
            ("avg_loss_pips", self.avg_loss_pips),
            ("profit_factor", self.profit_factor),
            ("avg_bars_in_trade", self.avg_bars_in_trade),
        ]
    }

    pub fn assessment(&self) -> Assessment {
        Assessment::from_win_rate(self.win_rate)
    }
}

/// Verdict on a win rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Assessment {
    Tradeable,
    Marginal,
    NeedsWork,
}

impl Assessment {
    pub fn from_win_rate(win_rate: f64) -> Self {
        if win_rate >= TRADEABLE_WIN_RATE {
            Assessment::Tradeable
        } else if win_rate >= MARGINAL_WIN_RATE {
            Assessment::Marginal
        } else {
            Assessment::NeedsWork
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Assessment::Tradeable => "Strategy meets 70%+ win rate requirement",
            Assessment::Marginal => "Consider tightening entry rules or optimizing parameters",
            Assessment::NeedsWork => "Optimize parameters before live trading",
        }
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assessment::Tradeable => write!(f, "TRADEABLE"),
            Assessment::Marginal => write!(f, "MARGINAL"),
            Assessment::NeedsWork => write!(f, "NEEDS WORK"),
        }
    }
}
