// Framework settings loaded from the environment or a TOML document

use crate::env::EnvLoader;
use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use trellis_core::Registry;
use trellis_core::logging::{LogConfig, LogFormat, LogLevel};

/// Environment used when nothing selects one
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Bootstrap settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Active runtime environment name
    pub environment: String,
    pub log_level: String,
    pub log_format: String,
    /// Reject bootstraps whose injection edges point at unregistered types
    pub strict_dependencies: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            log_level: "info".to_string(),
            log_format: "json".to_string(),
            strict_dependencies: false,
        }
    }
}

impl Settings {
    /// Settings from `TRELLIS_*` variables, defaults for anything unset
    pub fn from_env() -> Result<Self> {
        Self::from_loader(&EnvLoader::trellis())
    }

    pub fn from_loader(loader: &EnvLoader) -> Result<Self> {
        let defaults = Self::default();
        let strict = match loader.load_opt("STRICT_DEPENDENCIES") {
            Some(value) => parse_flag("strict_dependencies", &value)?,
            None => defaults.strict_dependencies,
        };

        let settings = Self {
            environment: loader
                .load_opt("ENV")
                .or_else(|| std::env::var("APP_ENV").ok().filter(|v| !v.is_empty()))
                .unwrap_or(defaults.environment),
            log_level: loader.load_opt("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: loader.load_opt("LOG_FORMAT").unwrap_or(defaults.log_format),
            strict_dependencies: strict,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Load a `.env` file into the process environment, then read settings
    pub fn from_dotenv(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                // A missing default .env is fine
                dotenvy::dotenv().ok();
            }
        }
        Self::from_env()
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(source).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Check every field can be used
    pub fn validate(&self) -> Result<()> {
        if self.environment.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                key: "environment".into(),
                reason: "must not be empty".into(),
            });
        }
        self.log_level()?;
        self.log_format()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<LogLevel> {
        self.log_level
            .parse()
            .map_err(|reason| ConfigError::InvalidSetting {
                key: "log_level".into(),
                reason,
            })
    }

    pub fn log_format(&self) -> Result<LogFormat> {
        self.log_format
            .parse()
            .map_err(|reason| ConfigError::InvalidSetting {
                key: "log_format".into(),
                reason,
            })
    }

    /// Logging configuration matching these settings
    pub fn log_config(&self) -> Result<LogConfig> {
        Ok(LogConfig::new()
            .level(self.log_level()?)
            .format(self.log_format()?))
    }

    /// Apply the dependency policy to a populated registry
    pub fn check_registry(&self, registry: &Registry) -> Result<()> {
        if self.strict_dependencies {
            registry.verify_dependencies()?;
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidSetting {
            key: key.to_string(),
            reason: format!("expected a boolean, got '{}'", value),
        }),
    }
}
