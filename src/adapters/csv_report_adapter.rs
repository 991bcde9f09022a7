//! File report adapter: trade log as CSV, summary as JSON.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktestError;
use crate::domain::metrics::{Assessment, MetricsSummary};
use crate::domain::simulation::TradeLogEntry;
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

pub const TRADE_LOG_FILE: &str = "backtest_trades.csv";
pub const METRICS_FILE: &str = "backtest_metrics.json";

#[derive(Debug, Serialize)]
struct MetricsDocument<'a> {
    #[serde(flatten)]
    metrics: &'a MetricsSummary,
    assessment: Assessment,
}

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn write_trade_log(&self, result: &BacktestResult, path: &Path) -> Result<(), BacktestError> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| BacktestError::Report {
            reason: format!("failed to create {}: {}", path.display(), e),
        })?;
        for trade in &result.trades {
            writer
                .serialize(TradeLogEntry::from(trade))
                .map_err(|e| BacktestError::Report {
                    reason: format!("failed to write trade row: {}", e),
                })?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_metrics(&self, result: &BacktestResult, path: &Path) -> Result<(), BacktestError> {
        let rounded = result.metrics.rounded();
        let document = MetricsDocument {
            metrics: &rounded,
            assessment: result.metrics.assessment(),
        };
        let json = serde_json::to_string_pretty(&document).map_err(|e| BacktestError::Report {
            reason: format!("failed to serialize metrics: {}", e),
        })?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    /// The trade log is only written when the run produced trades; the
    /// summary is always written.
    fn write(&self, result: &BacktestResult, output_dir: &Path) -> Result<(), BacktestError> {
        fs::create_dir_all(output_dir)?;

        if !result.trades.is_empty() {
            let trades_path = output_dir.join(TRADE_LOG_FILE);
            self.write_trade_log(result, &trades_path)?;
            info!(path = %trades_path.display(), trades = result.trades.len(), "trade log saved");
        }

        let metrics_path = output_dir.join(METRICS_FILE);
        self.write_metrics(result, &metrics_path)?;
        info!(path = %metrics_path.display(), "metrics saved");
        Ok(())
    }
}
