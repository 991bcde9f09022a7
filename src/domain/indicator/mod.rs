//! Indicator computation.
//!
//! This module provides:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorType`: Indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values
//! - `IndicatorBar`: A raw bar augmented with every derived field the
//!   signal scan reads, built by [`compute_indicators`]

pub mod ema;
pub mod session_range;
pub mod sma;

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::debug;

use crate::domain::ohlcv::Bar;
use crate::domain::pips::price_to_pips;
use crate::domain::strategy::StrategyConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: DateTime<Utc>,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn get(&self) -> Option<f64> {
        self.valid.then_some(self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    VolumeSma(usize),
    PriorHigh(usize),
    PriorLow(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(IndicatorPoint::get)
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|p| p.valid).count()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::VolumeSma(period) => write!(f, "VOLUME_SMA({})", period),
            IndicatorType::PriorHigh(window) => write!(f, "PRIOR_HIGH({})", window),
            IndicatorType::PriorLow(window) => write!(f, "PRIOR_LOW({})", window),
        }
    }
}

/// A bar plus its derived indicators. `None` marks a value still in warmup.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorBar {
    pub bar: Bar,
    pub trend: Option<f64>,
    pub trend_slope: Option<f64>,
    pub volume_baseline: Option<f64>,
    pub volume_spike: Option<bool>,
    pub body: f64,
    pub upper_wick: f64,
    pub lower_wick: f64,
    pub prior_session_high: Option<f64>,
    pub prior_session_low: Option<f64>,
}

impl IndicatorBar {
    pub fn body_pips(&self) -> f64 {
        price_to_pips(self.body)
    }

    pub fn upper_wick_pips(&self) -> f64 {
        price_to_pips(self.upper_wick)
    }

    pub fn lower_wick_pips(&self) -> f64 {
        price_to_pips(self.lower_wick)
    }
}

/// Derives every indicator for `bars` in one sequential pass.
pub fn compute_indicators(bars: &[Bar], config: &StrategyConfig) -> Vec<IndicatorBar> {
    let trend = ema::calculate_ema(bars, config.trend_length);
    let volume = sma::calculate_volume_sma(bars, config.volume_window);
    let prior_high = session_range::calculate_prior_high(bars, config.session_bars);
    let prior_low = session_range::calculate_prior_low(bars, config.session_bars);

    for series in [&trend, &volume, &prior_high, &prior_low] {
        debug!(
            indicator = %series.indicator_type,
            valid = series.valid_count(),
            total = series.values.len(),
            "computed indicator series"
        );
    }

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let avg = trend.value_at(i);
            let slope = match (avg, i.checked_sub(1).and_then(|p| trend.value_at(p))) {
                (Some(current), Some(previous)) => Some(current - previous),
                _ => None,
            };
            let baseline = volume.value_at(i);

            IndicatorBar {
                bar: bar.clone(),
                trend: avg,
                trend_slope: slope,
                volume_baseline: baseline,
                volume_spike: baseline.map(|b| bar.volume > config.volume_multiplier * b),
                body: bar.body(),
                upper_wick: bar.upper_wick(),
                lower_wick: bar.lower_wick(),
                prior_session_high: prior_high.value_at(i),
                prior_session_low: prior_low.value_at(i),
            }
        })
        .collect()
}
