//! Market data access port trait.

use crate::domain::error::BacktestError;
use crate::domain::ohlcv::Bar;
use chrono::NaiveDate;

/// Source of historical bars.
///
/// Implementations return the bars of `symbol` dated within
/// `[start_date, end_date]` in ascending timestamp order, or
/// [`BacktestError::DataUnavailable`] when the data cannot be obtained.
pub trait DataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, BacktestError>;
}
