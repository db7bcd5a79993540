pub mod loader;

pub use loader::ConfigLoader;

use crate::errors::ConfigError;
use serde::Deserialize;

/// File looked up inside `<config dir>/flux/`.
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FluxConfig {
    /// `[app]` table.
    pub app: AppSection,
    /// `[logging]` table.
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppSection {
    /// Surface command failures as errors instead of exit code `-1`.
    pub propagate_errors: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
    /// Prefix each line with the local `HH:MM:SS` time.
    pub timestamps: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            timestamps: true,
        }
    }
}

impl LoggingSection {
    /// Parse `level`, rejecting unknown names.
    pub fn level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        self.level
            .parse()
            .map_err(|_| ConfigError::InvalidValue("logging.level".to_string(), self.level.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_sections() {
        let config: FluxConfig = toml::from_str("[app]\npropagate_errors = true\n").unwrap();
        assert!(config.app.propagate_errors);
        assert_eq!(config.logging, LoggingSection::default());
    }

    #[test]
    fn level_filter_is_case_insensitive() {
        let logging = LoggingSection {
            level: "DEBUG".to_string(),
            timestamps: false,
        };
        assert_eq!(logging.level_filter().unwrap(), log::LevelFilter::Debug);
    }

    #[test]
    fn unknown_level_is_rejected() {
        let logging = LoggingSection {
            level: "chatty".to_string(),
            timestamps: true,
        };
        assert!(matches!(logging.level_filter(), Err(ConfigError::InvalidValue(..))));
    }
}
