// Prefixed environment variable lookup

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Prefix used for all Trellis variables
pub const DEFAULT_PREFIX: &str = "TRELLIS";

/// Reads `<PREFIX>_<KEY>` variables
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Loader for `TRELLIS_*` variables
    pub fn trellis() -> Self {
        Self::new(Some(DEFAULT_PREFIX.to_string()))
    }

    /// Full variable name for a key
    pub fn var_name(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    /// All matching variables, keys lowercased and stripped of the prefix
    pub fn load(&self) -> HashMap<String, String> {
        env::vars()
            .filter_map(|(key, value)| match &self.prefix {
                Some(prefix) => key
                    .strip_prefix(prefix.as_str())
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| (rest.to_lowercase(), value)),
                None => Some((key.to_lowercase(), value)),
            })
            .collect()
    }

    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.var_name(key)).map_err(ConfigError::EnvError)
    }

    /// A variable, or `None` if unset or empty
    pub fn load_opt(&self, key: &str) -> Option<String> {
        self.load_var(key).ok().filter(|value| !value.is_empty())
    }

    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_opt(key).unwrap_or_else(|| default.to_string())
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::trellis()
    }
}
