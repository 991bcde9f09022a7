#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sessiontrader::domain::backtest::BacktestResult;
use sessiontrader::domain::error::BacktestError;
pub use sessiontrader::domain::ohlcv::Bar;
use sessiontrader::ports::data_port::DataPort;
use sessiontrader::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Index of the rejection bar in [`long_signal_bars`].
pub const REJECTION_INDEX: usize = 119;
/// Index of the confirmation bar (10:00 UTC) in [`long_signal_bars`].
pub const SIGNAL_INDEX: usize = 120;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, BacktestError> {
        let unavailable = |reason: String| BacktestError::DataUnavailable {
            symbol: symbol.to_string(),
            reason,
        };
        if let Some(reason) = self.errors.get(symbol) {
            return Err(unavailable(reason.clone()));
        }
        let bars: Vec<Bar> = self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| {
                        let d = b.timestamp.date_naive();
                        d >= start_date && d <= end_date
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if bars.is_empty() {
            return Err(unavailable("no bars".to_string()));
        }
        Ok(bars)
    }
}

pub struct MockReportPort {
    pub calls: RefCell<Vec<(BacktestResult, PathBuf)>>,
}

impl MockReportPort {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for MockReportPort {
    fn write(&self, result: &BacktestResult, output_dir: &Path) -> Result<(), BacktestError> {
        self.calls
            .borrow_mut()
            .push((result.clone(), output_dir.to_path_buf()));
        Ok(())
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(index: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
    Bar {
        timestamp: start_time() + Duration::minutes(5 * index as i64),
        open,
        high,
        low,
        close,
        volume,
    }
}

/// Five-minute bars from midnight, creeping up 0.1 pip per bar from 1.0330
/// with flat volume. On their own they never signal.
pub fn drift_bars(count: usize) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            let close = 1.0330 + 0.00001 * i as f64;
            make_bar(i, close - 0.00001, close + 0.00005, close - 0.00005, close, 100.0)
        })
        .collect()
}

/// Drift bars with a long setup planted at `signal_index`: a volume-spiking
/// hammer before it, and a bullish close on the 1.0350 round number.
pub fn long_setup_at(count: usize, signal_index: usize) -> Vec<Bar> {
    let mut bars = drift_bars(count);
    bars[signal_index - 1] = make_bar(signal_index - 1, 1.0342, 1.0344, 1.0330, 1.0343, 1000.0);
    bars[signal_index] = make_bar(signal_index, 1.0343, 1.0351, 1.0342, 1.0350, 100.0);
    bars
}

/// One long signal at [`SIGNAL_INDEX`]: entry 1.0350, stop 1.0335,
/// TP1 1.0370, TP2 1.0380. No forward bar reaches any level.
pub fn long_signal_bars(count: usize) -> Vec<Bar> {
    long_setup_at(count, SIGNAL_INDEX)
}
