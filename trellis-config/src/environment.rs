// Active runtime environment and config object selection

use crate::settings::{DEFAULT_ENVIRONMENT, Settings};
use crate::{ConfigError, Result};
use trellis_core::logging::debug;
use trellis_core::{ConfigDescriptor, Registry};

/// Variables consulted, in order, when no environment is given explicitly
pub const ENVIRONMENT_VARIABLES: [&str; 2] = ["TRELLIS_ENV", "APP_ENV"];

/// The environment the application runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEnvironment {
    name: String,
}

impl ActiveEnvironment {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Explicit name, else the first set variable of
    /// [`ENVIRONMENT_VARIABLES`], else `development`
    pub fn resolve(explicit: Option<&str>) -> Self {
        Self::resolve_with(explicit, |name| std::env::var(name).ok())
    }

    /// [`resolve`](Self::resolve) with a custom variable lookup
    pub fn resolve_with<F>(explicit: Option<&str>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = explicit
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| {
                ENVIRONMENT_VARIABLES
                    .iter()
                    .find_map(|var| lookup(var).filter(|value| !value.is_empty()))
            })
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        Self::new(name)
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.environment.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Config object registered for this environment
    pub fn select(&self, registry: &Registry) -> Result<ConfigDescriptor> {
        let descriptor = registry
            .get_config_for(&self.name)
            .ok_or_else(|| ConfigError::NoConfigForEnvironment(self.name.clone()))?;
        debug!(environment = %self.name, config = %descriptor.config, "Selected config object");
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_explicit_wins() {
        let env = ActiveEnvironment::resolve_with(Some("prod"), lookup(&[("TRELLIS_ENV", "dev")]));
        assert_eq!(env.name(), "prod");
    }

    #[test]
    fn test_variable_precedence() {
        let env = ActiveEnvironment::resolve_with(
            None,
            lookup(&[("APP_ENV", "staging"), ("TRELLIS_ENV", "dev")]),
        );
        assert_eq!(env.name(), "dev");

        let env = ActiveEnvironment::resolve_with(Some(""), lookup(&[("APP_ENV", "staging")]));
        assert_eq!(env.name(), "staging");
    }

    #[test]
    fn test_default_environment() {
        let env = ActiveEnvironment::resolve_with(None, lookup(&[("TRELLIS_ENV", "")]));
        assert_eq!(env.name(), "development");
    }
}
