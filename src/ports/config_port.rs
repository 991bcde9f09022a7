//! Configuration access port trait.

use crate::domain::error::BacktestError;

/// Typed access to sectioned configuration.
///
/// Numeric getters fall back to `default` when the key is absent and fail
/// with [`BacktestError::ConfigInvalid`] when it is present but unparsable.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, BacktestError>;
    fn get_usize(&self, section: &str, key: &str, default: usize) -> Result<usize, BacktestError>;
}
