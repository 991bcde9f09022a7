//! Input sequence checks run before any indicator is computed.

use crate::domain::error::BacktestError;
use crate::domain::ohlcv::Bar;

/// Rejects sequences too short to warm up, and rows with impossible prices,
/// negative volume or out-of-order timestamps. Rows are numbered from 0.
pub fn validate_bars(bars: &[Bar], minimum: usize) -> Result<(), BacktestError> {
    if bars.len() < minimum {
        return Err(BacktestError::InsufficientData {
            bars: bars.len(),
            minimum,
        });
    }

    for (row, bar) in bars.iter().enumerate() {
        validate_bar(row, bar)?;
        if row > 0 && bar.timestamp <= bars[row - 1].timestamp {
            return Err(BacktestError::malformed(
                row,
                format!(
                    "timestamp {} is not after {}",
                    bar.timestamp,
                    bars[row - 1].timestamp
                ),
            ));
        }
    }
    Ok(())
}

fn validate_bar(row: usize, bar: &Bar) -> Result<(), BacktestError> {
    for (name, price) in [
        ("open", bar.open),
        ("high", bar.high),
        ("low", bar.low),
        ("close", bar.close),
    ] {
        if !price.is_finite() || price <= 0.0 {
            return Err(BacktestError::malformed(
                row,
                format!("{} must be a positive price, got {}", name, price),
            ));
        }
    }
    if bar.high < bar.low {
        return Err(BacktestError::malformed(row, "high below low"));
    }
    if !bar.volume.is_finite() || bar.volume < 0.0 {
        return Err(BacktestError::malformed(
            row,
            format!("volume must be non-negative, got {}", bar.volume),
        ));
    }
    Ok(())
}
