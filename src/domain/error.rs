//! Domain error types.

/// Top-level error type for sessiontrader.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("malformed input at row {row}: {reason}")]
    MalformedInput { row: usize, reason: String },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BacktestError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        BacktestError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(row: usize, reason: impl Into<String>) -> Self {
        BacktestError::MalformedInput {
            row,
            reason: reason.into(),
        }
    }
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        let code: u8 = match err {
            BacktestError::Io(_) => 1,
            BacktestError::ConfigParse { .. }
            | BacktestError::ConfigMissing { .. }
            | BacktestError::ConfigInvalid { .. } => 2,
            BacktestError::DataUnavailable { .. }
            | BacktestError::MalformedInput { .. }
            | BacktestError::InsufficientData { .. } => 5,
            BacktestError::Report { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
