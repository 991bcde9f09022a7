//! Report persistence port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktestError;
use std::path::Path;

/// Port for persisting the trade log and metrics summary of a run.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_dir: &Path) -> Result<(), BacktestError>;
}
