//! Exponential Moving Average of close.
//!
//! α = 2/(n+1), seeded with the first close, then EMA[i] = EMA[i-1] + α·(C[i] - EMA[i-1]).
//! Defined from the first bar onward.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn smoothing_factor(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

pub fn calculate_ema(bars: &[Bar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(period),
            values: Vec::new(),
        };
    }

    let alpha = smoothing_factor(period);

    let values = bars
        .iter()
        .scan(None::<f64>, |state, bar| {
            let ema = match *state {
                None => bar.close,
                Some(prev) => prev + alpha * (bar.close - prev),
            };
            *state = Some(ema);
            Some(IndicatorPoint {
                timestamp: bar.timestamp,
                valid: true,
                value: ema,
            })
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}
