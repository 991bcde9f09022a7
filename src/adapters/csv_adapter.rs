//! CSV file data adapter.
//!
//! Reads `<SYMBOL>.csv` from a base directory. Expected header:
//! `timestamp,open,high,low,close,volume`. Timestamps are RFC 3339 or
//! `YYYY-MM-DD HH:MM:SS` (taken as UTC).

use crate::domain::error::BacktestError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse_field(record: &csv::StringRecord, index: usize, name: &str, row: usize) -> Result<f64, BacktestError> {
    record
        .get(index)
        .ok_or_else(|| BacktestError::malformed(row, format!("missing {} column", name)))?
        .trim()
        .parse()
        .map_err(|e| BacktestError::malformed(row, format!("invalid {} value: {}", name, e)))
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, BacktestError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| BacktestError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result
                .map_err(|e| BacktestError::malformed(row, format!("CSV parse error: {}", e)))?;

            let raw_ts = record
                .get(0)
                .ok_or_else(|| BacktestError::malformed(row, "missing timestamp column"))?;
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| {
                BacktestError::malformed(row, format!("invalid timestamp {:?}", raw_ts))
            })?;

            let date = timestamp.date_naive();
            if date < start_date || date > end_date {
                continue;
            }

            bars.push(Bar {
                timestamp,
                open: parse_field(&record, 1, "open", row)?,
                high: parse_field(&record, 2, "high", row)?,
                low: parse_field(&record, 3, "low", row)?,
                close: parse_field(&record, 4, "close", row)?,
                volume: parse_field(&record, 5, "volume", row)?,
            });
        }

        if bars.is_empty() {
            return Err(BacktestError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("no bars between {} and {}", start_date, end_date),
            });
        }

        if bars.windows(2).any(|w| w[1].timestamp < w[0].timestamp) {
            warn!(symbol, path = %path.display(), "rows out of timestamp order, sorting");
            bars.sort_by_key(|b| b.timestamp);
        }
        debug!(symbol, bars = bars.len(), path = %path.display(), "loaded bars");
        Ok(bars)
    }
}
