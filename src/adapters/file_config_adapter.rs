//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    /// No sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

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

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
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
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[signals]
long_enter = Buy
short_exit = Cover
init_pos = -2

[resolver]
backend = batch

[execution]
price_column = Open
lag = 1

[output]
compact = no
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("signals", "long_enter"),
            Some("Buy".to_string())
        );
        assert_eq!(
            adapter.get_string("resolver", "backend"),
            Some("batch".to_string())
        );
        assert_eq!(adapter.get_string("signals", "long_exit"), None);
        assert_eq!(adapter.get_string("missing", "key"), None);
    }

    #[test]
    fn empty_adapter_returns_defaults() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("signals", "long_enter"), None);
        assert_eq!(adapter.get_int("execution", "lag", 3), 3);
        assert_eq!(adapter.get_double("signals", "init_pos", 0.5), 0.5);
        assert!(adapter.get_bool("output", "compact", true));
    }

    #[test]
    fn numeric_lookups() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("execution", "lag", 0), 1);
        assert_eq!(adapter.get_double("signals", "init_pos", 0.0), -2.0);
    }

    #[test]
    fn numeric_lookups_default_on_garbage() {
        let adapter =
            FileConfigAdapter::from_string("[execution]\nlag = soon\n[signals]\ninit_pos = x\n")
                .unwrap();
        assert_eq!(adapter.get_int("execution", "lag", 7), 7);
        assert_eq!(adapter.get_double("signals", "init_pos", 1.5), 1.5);
    }

    #[test]
    fn bool_lookups() {
        let adapter = FileConfigAdapter::from_string(
            "[output]\na = yes\nb = Off\nc = 1\nd = maybe\n",
        )
        .unwrap();
        assert!(adapter.get_bool("output", "a", false));
        assert!(!adapter.get_bool("output", "b", true));
        assert!(adapter.get_bool("output", "c", false));
        assert!(adapter.get_bool("output", "d", true));
        assert!(!adapter.get_bool("output", "d", false));

        let sample = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert!(!sample.get_bool("output", "compact", true));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("execution", "price_column"),
            Some("Open".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_error() {
        assert!(FileConfigAdapter::from_file("/nonexistent/sigtrade.ini").is_err());
    }
}
