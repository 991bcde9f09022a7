//! INI file configuration adapter.

use crate::domain::error::BacktestError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use std::str::FromStr;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_or<T: FromStr>(
        &self,
        section: &str,
        key: &str,
        default: T,
        expected: &str,
    ) -> Result<T, BacktestError> {
        match self.config.get(section, key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| {
                BacktestError::invalid(
                    section,
                    key,
                    format!("expected {}, got {:?}", expected, raw),
                )
            }),
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, BacktestError> {
        self.parse_or(section, key, default, "a number")
    }

    fn get_usize(&self, section: &str, key: &str, default: usize) -> Result<usize, BacktestError> {
        self.parse_or(section, key, default, "a non-negative integer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_sections() {
        let content = r#"
[backtest]
symbol = EURUSD
data_dir = data

[strategy]
volume_multiplier = 2.0
max_bars = 48

[session]
start_hour = 7
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "symbol"),
            Some("EURUSD".to_string())
        );
        assert_eq!(adapter.get_double("strategy", "volume_multiplier", 1.5).unwrap(), 2.0);
        assert_eq!(adapter.get_usize("strategy", "max_bars", 60).unwrap(), 48);
        assert_eq!(adapter.get_usize("session", "start_hour", 8).unwrap(), 7);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nsymbol = EURUSD\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn numeric_defaults_for_missing() {
        let adapter = FileConfigAdapter::from_string("[strategy]\n").unwrap();
        assert_eq!(adapter.get_double("strategy", "tp1_pips", 20.0).unwrap(), 20.0);
        assert_eq!(adapter.get_usize("strategy", "max_bars", 60).unwrap(), 60);
    }

    #[test]
    fn non_numeric_double_is_invalid() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\nstop_loss_pips = fifteen\n").unwrap();
        let err = adapter
            .get_double("strategy", "stop_loss_pips", 15.0)
            .unwrap_err();
        assert!(
            matches!(err, BacktestError::ConfigInvalid { section, key, .. } if section == "strategy" && key == "stop_loss_pips")
        );
    }

    #[test]
    fn negative_integer_is_invalid() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nmax_bars = -5\n").unwrap();
        assert!(adapter.get_usize("strategy", "max_bars", 60).is_err());
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[backtest]\noutput_dir = /tmp/results\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "output_dir"),
            Some("/tmp/results".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(result.is_err());
    }
}
