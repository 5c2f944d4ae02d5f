//! INI file configuration adapter.

use crate::domain::config_validation::parse_bool;
use crate::domain::error::CrosstraderError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

/// `[data]`, `[strategy]` and `[backtest]` sections of an INI file.
/// Section and key names are case-insensitive.
#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CrosstraderError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| CrosstraderError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, CrosstraderError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| CrosstraderError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[data]
path = ./data
symbol = INFY

[strategy]
rsi_period = 14
rsi_buy = 27.5
use_sma_filter = no

[backtest]
stop_loss = 0.02
force_signal = yes
"#;

    #[test]
    fn reads_every_section() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("data", "symbol"), Some("INFY".to_string()));
        assert_eq!(adapter.get_int("strategy", "rsi_period", 0), 14);
        assert_eq!(adapter.get_double("strategy", "rsi_buy", 0.0), 27.5);
        assert!(!adapter.get_bool("strategy", "use_sma_filter", true));
        assert_eq!(adapter.get_double("backtest", "stop_loss", 0.0), 0.02);
        assert!(adapter.get_bool("backtest", "force_signal", false));
    }

    #[test]
    fn section_and_key_names_are_case_insensitive() {
        let adapter = FileConfigAdapter::from_string("[Strategy]\nRSI_Period = 9\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "rsi_period", 0), 9);
    }

    #[test]
    fn missing_keys_fall_back() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("backtest", "start_date"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert_eq!(adapter.get_int("strategy", "ema_period", 50), 50);
        assert_eq!(adapter.get_double("backtest", "take_profit", 0.04), 0.04);
        assert!(adapter.get_bool("strategy", "use_macd_filter", true));
    }

    #[test]
    fn unparsable_values_fall_back() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\nrsi_period = abc\nuse_sma_filter = maybe\n")
                .unwrap();
        assert_eq!(adapter.get_int("strategy", "rsi_period", 14), 14);
        assert_eq!(adapter.get_double("strategy", "rsi_period", 1.5), 1.5);
        assert!(adapter.get_bool("strategy", "use_sma_filter", true));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("data", "path"), Some("./data".to_string()));
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/config.ini").unwrap_err();
        assert!(matches!(err, CrosstraderError::ConfigParse { .. }));
    }
}
