/*!
 * Error types for dyndelegate
 */

use std::fmt;
use thiserror::Error;

use crate::failure::Failure;
use crate::locator::LocatorError;

pub type Result<T> = std::result::Result<T, DelegateError>;

#[derive(Error, Debug)]
pub enum DelegateError {
    /// Invalid factory input, such as a concrete type as delegate interface
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The resource locator could not resolve the service
    #[error("Lookup of '{service}' failed: {source}")]
    Lookup {
        service: String,
        #[source]
        source: LocatorError,
    },

    /// The factory handle failed to build a backend
    #[error("Error creating backend for '{service}': {source}")]
    Construction {
        service: String,
        #[source]
        source: Failure,
    },

    /// The resolved backend does not provide every interface method
    #[error("The backend bound to '{service}' does not implement {interface} (missing {})", .missing.join(", "))]
    InterfaceMismatch {
        service: String,
        interface: String,
        missing: Vec<String>,
    },

    /// The called method is not declared on the delegate's interface
    #[error("{interface} declares no method '{method}' taking {arity} argument(s) of these shapes")]
    UndeclaredMethod {
        interface: String,
        method: String,
        arity: usize,
    },

    /// Forwarding found no backend method with this name and argument shape
    #[error("Could not find method '{method}' taking {arity} argument(s) on backend {backend}")]
    NoSuchBackendMethod {
        backend: String,
        method: String,
        arity: usize,
    },

    /// The matching backend method may not be called from outside
    #[error("Method '{method}' on backend {backend} is not accessible")]
    AccessDenied { backend: String, method: String },

    /// Identity recovery on a value this factory did not produce
    #[error("The argument is not a dynamic delegate")]
    NotADelegate,

    /// Call through a delegate retired under the fail-fast policy
    #[error("The delegate for '{service}' has been retired")]
    Retired { service: String },

    /// The backend's result could not be decoded into the requested type
    #[error("Unexpected result shape from '{method}': {source}")]
    ResultShape {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    /// Translated failure raised by the backend method
    #[error(transparent)]
    Business(Failure),
}

impl DelegateError {
    /// Translated business failure, if this is one
    pub fn business(&self) -> Option<&Failure> {
        match self {
            DelegateError::Business(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn into_business(self) -> Option<Failure> {
        match self {
            DelegateError::Business(failure) => Some(failure),
            _ => None,
        }
    }

    /// Everything except business failures: the error reflects a mismatch
    /// between caller, delegate and backend rather than backend logic
    pub fn is_structural(&self) -> bool {
        !matches!(self, DelegateError::Business(_))
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            DelegateError::Configuration(_) => ErrorCategory::Configuration,
            DelegateError::Lookup { .. } => ErrorCategory::Lookup,
            DelegateError::Construction { .. } => ErrorCategory::Construction,
            DelegateError::InterfaceMismatch { .. } => ErrorCategory::Mismatch,
            DelegateError::UndeclaredMethod { .. }
            | DelegateError::NoSuchBackendMethod { .. }
            | DelegateError::AccessDenied { .. }
            | DelegateError::ResultShape { .. } => ErrorCategory::Dispatch,
            DelegateError::NotADelegate => ErrorCategory::Identity,
            DelegateError::Retired { .. } => ErrorCategory::Lifecycle,
            DelegateError::Business(_) => ErrorCategory::Business,
        }
    }
}

/// Error category for classification and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid factory input
    Configuration,
    /// Service resolution
    Lookup,
    /// Backend instantiation
    Construction,
    /// Backend does not fit the interface
    Mismatch,
    /// Call routing between delegate and backend
    Dispatch,
    /// Delegate identity recovery
    Identity,
    /// Use after retirement
    Lifecycle,
    /// Backend business failure
    Business,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Lookup => write!(f, "lookup"),
            ErrorCategory::Construction => write!(f, "construction"),
            ErrorCategory::Mismatch => write!(f, "mismatch"),
            ErrorCategory::Dispatch => write!(f, "dispatch"),
            ErrorCategory::Identity => write!(f, "identity"),
            ErrorCategory::Lifecycle => write!(f, "lifecycle"),
            ErrorCategory::Business => write!(f, "business"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_business_accessors() {
        let failure = Failure::checked("insufficient funds");
        let err = DelegateError::Business(failure.clone());

        assert!(err.business().unwrap().same(&failure));
        assert!(!err.is_structural());
        assert_eq!(err.category(), ErrorCategory::Business);
        assert!(err.into_business().unwrap().same(&failure));
        assert!(DelegateError::NotADelegate.business().is_none());
    }

    #[test]
    fn test_business_is_transparent() {
        let err = DelegateError::Business(Failure::checked("insufficient funds"));
        assert_eq!(err.to_string(), "checked failure: insufficient funds");
    }

    #[test]
    fn test_mismatch_message_lists_missing_methods() {
        let err = DelegateError::InterfaceMismatch {
            service: "accounts/Ledger".to_string(),
            interface: "Ledger".to_string(),
            missing: vec!["balance()".to_string(), "post(integer)".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "The backend bound to 'accounts/Ledger' does not implement Ledger (missing balance(), post(integer))"
        );
        assert!(err.is_structural());
    }

    #[test]
    fn test_construction_keeps_cause() {
        let cause = Failure::checked("create refused");
        let err = DelegateError::Construction {
            service: "accounts/Ledger".to_string(),
            source: cause,
        };
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("checked failure: create refused".to_string())
        );
        assert_eq!(err.category().to_string(), "construction");
    }

    #[test]
    fn test_lookup_keeps_locator_error() {
        let err = DelegateError::Lookup {
            service: "accounts/Ledger (local)".to_string(),
            source: LocatorError::NotBound("accounts/Ledger".to_string()),
        };
        assert!(err.source().is_some());
        assert_eq!(err.category(), ErrorCategory::Lookup);
    }
}
