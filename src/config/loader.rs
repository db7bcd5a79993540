use super::{FluxConfig, CONFIG_FILE_NAME};
use crate::errors::ConfigError;
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{env, fs};

/// Path of the configuration file, overriding the default location.
pub const CONFIG_PATH_ENV: &str = "FLUX_CONFIG";
/// Log level override.
pub const LOG_LEVEL_ENV: &str = "FLUX_LOG";
pub const PROPAGATE_ERRORS_ENV: &str = "FLUX_PROPAGATE_ERRORS";

/// Loads `FluxConfig` from a TOML file and the environment.
///
/// The file is `$FLUX_CONFIG` when set, otherwise `flux/config.toml` under
/// the user's config directory. A missing default file yields the defaults;
/// a missing explicit file is an error.
pub struct ConfigLoader {
    path: Option<PathBuf>,
    env: HashMap<String, String>,
}

impl ConfigLoader {
    /// Resolve the file the default way, capturing `FLUX_*` variables.
    pub fn new() -> Self {
        Self {
            path: None,
            env: env::vars().filter(|(key, _)| key.starts_with("FLUX_")).collect(),
        }
    }

    /// Load from an explicit file (for testing)
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            env: HashMap::new(),
        }
    }

    /// Replace the captured environment (for testing)
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Read the file (if any), then apply environment overrides.
    pub fn load(&self) -> Result<FluxConfig, ConfigError> {
        let mut config = match self.config_path() {
            Some((path, explicit)) if explicit || path.exists() => {
                debug!("Loading configuration from {}", path.display());
                Self::read_file(&path)?
            }
            _ => {
                debug!("No configuration file found, using defaults");
                FluxConfig::default()
            }
        };

        self.apply_env(&mut config)?;
        config.logging.level_filter()?;
        Ok(config)
    }

    /// The file to read and whether it was requested explicitly.
    fn config_path(&self) -> Option<(PathBuf, bool)> {
        if let Some(path) = &self.path {
            return Some((path.clone(), true));
        }
        if let Some(path) = self.env.get(CONFIG_PATH_ENV) {
            return Some((PathBuf::from(path), true));
        }
        dirs::config_dir().map(|dir| (dir.join("flux").join(CONFIG_FILE_NAME), false))
    }

    fn read_file(path: &Path) -> Result<FluxConfig, ConfigError> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::FileRead(display.clone(), e))?;
        toml::from_str(&content).map_err(|e| ConfigError::TomlParse(display, e))
    }

    fn apply_env(&self, config: &mut FluxConfig) -> Result<(), ConfigError> {
        if let Some(level) = self.env.get(LOG_LEVEL_ENV) {
            config.logging.level = level.clone();
        }
        if let Some(value) = self.env.get(PROPAGATE_ERRORS_ENV) {
            config.app.propagate_errors = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        PROPAGATE_ERRORS_ENV.to_string(),
                        value.clone(),
                    ))
                }
            };
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_values_from_file() {
        let file = write_config("[app]\npropagate_errors = true\n\n[logging]\nlevel = \"debug\"\ntimestamps = false\n");

        let config = ConfigLoader::with_path(file.path()).load().unwrap();
        assert!(config.app.propagate_errors);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.timestamps);
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config("[logging]\nlevel = \"info\"\n");
        let env = HashMap::from([
            (LOG_LEVEL_ENV.to_string(), "trace".to_string()),
            (PROPAGATE_ERRORS_ENV.to_string(), "yes".to_string()),
        ]);

        let config = ConfigLoader::with_path(file.path()).with_env(env).load().unwrap();
        assert_eq!(config.logging.level, "trace");
        assert!(config.app.propagate_errors);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigLoader::with_path(dir.path().join("absent.toml")).load();
        assert!(matches!(result, Err(ConfigError::FileRead(..))));
    }

    #[test]
    fn malformed_toml_is_reported() {
        let file = write_config("[logging\nlevel = ");
        let result = ConfigLoader::with_path(file.path()).load();
        assert!(matches!(result, Err(ConfigError::TomlParse(..))));
    }

    #[test]
    fn invalid_environment_values_are_rejected() {
        let file = write_config("");
        let env = HashMap::from([(PROPAGATE_ERRORS_ENV.to_string(), "maybe".to_string())]);
        let result = ConfigLoader::with_path(file.path()).with_env(env).load();
        assert!(matches!(result, Err(ConfigError::InvalidValue(..))));

        let env = HashMap::from([(LOG_LEVEL_ENV.to_string(), "loud".to_string())]);
        let result = ConfigLoader::with_path(file.path()).with_env(env).load();
        assert!(matches!(result, Err(ConfigError::InvalidValue(..))));
    }
}
