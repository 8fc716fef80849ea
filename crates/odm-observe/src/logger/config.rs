use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::{error::LoggerError, format::LoggerFormat};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// Level or full filter directive, e.g. `info` or `info,odm_core=debug`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let use_color = cfg!(test) || std::io::stdout().is_terminal();
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color,
        }
    }
}

impl LoggerConfig {
    /// Build from the textual settings of a config file.
    pub fn from_settings(level: &str, format: &str) -> Result<Self, LoggerError> {
        let level = level.trim();
        if level.is_empty() {
            return Err(LoggerError::InvalidLogLevel(level.to_string()));
        }
        Ok(Self {
            format: format.parse()?,
            level: level.to_string(),
            ..Self::default()
        })
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_parse_format_and_keep_level() {
        let cfg = LoggerConfig::from_settings("debug", "JSON").unwrap();
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert_eq!(cfg.level, "debug");
        assert!(cfg.with_targets);
    }

    #[test]
    fn blank_level_or_unknown_format_fail() {
        assert!(matches!(
            LoggerConfig::from_settings("  ", "text"),
            Err(LoggerError::InvalidLogLevel(_))
        ));
        assert!(matches!(
            LoggerConfig::from_settings("info", "xml"),
            Err(LoggerError::InvalidFormat(_))
        ));
    }

    #[test]
    fn with_level_overrides() {
        let cfg = LoggerConfig::default().with_level("warn");
        assert_eq!(cfg.level, "warn");
        assert_eq!(cfg.format, LoggerFormat::Text);
    }
}
