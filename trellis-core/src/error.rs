// Error types for the Trellis registration layer

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A component was registered with missing or invalid role arguments.
    #[error("Configuration error in {component}: {reason}")]
    Configuration { component: String, reason: String },

    /// A component does not honour the contract of the role it claims.
    #[error("Contract violation in {component}: {reason}")]
    ContractViolation { component: String, reason: String },

    /// A declared injection edge points at a type no role has registered.
    #[error("Unresolved dependency: {owner}.{field} requires {declared}")]
    UnresolvedDependency {
        owner: String,
        field: String,
        declared: String,
    },

    #[error("Unknown HTTP method: {0}")]
    UnknownMethod(String),
}

impl Error {
    /// Build a configuration error for the given component
    pub fn configuration(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Configuration {
            component: component.into(),
            reason: reason.into(),
        }
    }

    /// Build a contract violation for the given component
    pub fn contract_violation(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ContractViolation {
            component: component.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error must abort application bootstrap
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Configuration { .. } | Error::ContractViolation { .. }
        )
    }

    /// Name of the offending component, if the error carries one
    pub fn component(&self) -> Option<&str> {
        match self {
            Error::Configuration { component, .. } | Error::ContractViolation { component, .. } => {
                Some(component)
            }
            Error::UnresolvedDependency { owner, .. } => Some(owner),
            Error::UnknownMethod(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_is_fatal() {
        let err = Error::configuration("AppConfig", "missing environment name");
        assert!(err.is_fatal());
        assert_eq!(err.component(), Some("AppConfig"));
        assert_eq!(
            err.to_string(),
            "Configuration error in AppConfig: missing environment name"
        );
    }

    #[test]
    fn test_contract_violation_names_component() {
        let err = Error::contract_violation("app::AuthMiddleware", "no resolve capability");
        assert!(err.is_fatal());
        assert!(err.to_string().contains("app::AuthMiddleware"));
    }

    #[test]
    fn test_unresolved_dependency_is_not_fatal() {
        let err = Error::UnresolvedDependency {
            owner: "UserController".into(),
            field: "repo".into(),
            declared: "UserRepository".into(),
        };
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Unresolved dependency: UserController.repo requires UserRepository"
        );
    }
}
