//! Simple moving average of volume.
//!
//! Invalid until `period` bars have been seen.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn calculate_volume_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::VolumeSma(period),
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        sum += bar.volume;
        if i >= period {
            sum -= bars[i - period].volume;
        }

        let valid = i + 1 >= period;
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: if valid { sum / period as f64 } else { 0.0 },
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::VolumeSma(period),
        values,
    }
}
