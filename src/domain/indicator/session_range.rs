//! Prior-session extrema.
//!
//! Rolling max(high) / min(low) over the `window` bars before each bar, the
//! current bar excluded. One prior bar is enough for a value, so only the first
//! bar of the sequence is invalid.

use std::collections::VecDeque;

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn calculate_prior_high(bars: &[Bar], window: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::PriorHigh(window),
        values: rolling_prior_extreme(bars, window, |b| b.high, |kept, new| kept >= new),
    }
}

pub fn calculate_prior_low(bars: &[Bar], window: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::PriorLow(window),
        values: rolling_prior_extreme(bars, window, |b| b.low, |kept, new| kept <= new),
    }
}

/// Monotonic-deque sliding extreme. `dominates(kept, new)` decides whether an
/// older candidate survives a newer value.
fn rolling_prior_extreme(
    bars: &[Bar],
    window: usize,
    price: impl Fn(&Bar) -> f64,
    dominates: impl Fn(f64, f64) -> bool,
) -> Vec<IndicatorPoint> {
    if window == 0 {
        return Vec::new();
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut candidates: VecDeque<usize> = VecDeque::new();

    for (i, bar) in bars.iter().enumerate() {
        // evict bars older than the window [i - window, i - 1]; front < i
        while let Some(&front) = candidates.front() {
            if i - front > window {
                candidates.pop_front();
            } else {
                break;
            }
        }

        let point = match candidates.front() {
            Some(&best) => IndicatorPoint {
                timestamp: bar.timestamp,
                valid: true,
                value: price(&bars[best]),
            },
            None => IndicatorPoint {
                timestamp: bar.timestamp,
                valid: false,
                value: 0.0,
            },
        };
        values.push(point);

        let current = price(bar);
        while let Some(&back) = candidates.back() {
            if dominates(price(&bars[back]), current) {
                break;
            }
            candidates.pop_back();
        }
        candidates.push_back(i);
    }

    values
}
