use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::clock::LoggerTimeZone;
use crate::format::LoggerFormat;
use crate::level::LoggerLevel;

/// Logger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// Filter expression (e.g. `"info"`, `"canary_watch=debug,info"`).
    pub level: LoggerLevel,
    pub tz: LoggerTimeZone,
    /// Include module targets in output.
    pub with_targets: bool,
    /// Colored text output; only honoured when stdout is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    pub fn with_format(mut self, format: LoggerFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LoggerLevel) -> Self {
        self.level = level;
        self
    }

    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let cfg: LoggerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, LoggerConfig::default());
        assert_eq!(cfg.format, LoggerFormat::Text);
        assert_eq!(cfg.level.as_str(), "info");
        assert!(cfg.with_targets);
    }

    #[test]
    fn partial_object_overrides_fields() {
        let cfg: LoggerConfig =
            serde_json::from_str(r#"{"format": "json", "level": "canary_watch=debug,info", "tz": "local"}"#)
                .unwrap();
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert_eq!(cfg.level.as_str(), "canary_watch=debug,info");
        assert_eq!(cfg.tz, LoggerTimeZone::Local);
        assert!(cfg.use_color);
    }

    #[test]
    fn invalid_level_fails_deserialization() {
        assert!(serde_json::from_str::<LoggerConfig>(r#"{"level": "canary=shout"}"#).is_err());
    }

    #[test]
    fn builders_override() {
        let cfg = LoggerConfig::default()
            .with_format(LoggerFormat::Json)
            .with_level("warn".parse().unwrap());
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert_eq!(cfg.level.as_str(), "warn");
    }
}
