//! Resource location: mapping service identifiers to backend factory handles
//!
//! The delegate factory consumes a [`ResourceLocator`] to turn a
//! [`ServiceDescriptor`] into a [`FactoryHandle`], then asks the handle for a
//! backend instance. How a locator finds its handles (naming service,
//! connection setup, addressing) is entirely up to the implementation.
//!
//! Two stock pieces live here:
//!
//! - [`DirectoryLocator`]: in-memory, non-caching naming directory
//! - [`Home`]: factory handle with construction entry points keyed by
//!   parameter shape

mod directory;
mod home;

pub use directory::DirectoryLocator;
pub use home::{Constructor, Home};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::backend::Backend;
use crate::failure::Failure;
use crate::interface::Value;

/// How the backend is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    /// Same address space as the caller
    Local,

    /// Reached through a remote access layer
    Remote,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Local => f.write_str("local"),
            AccessMode::Remote => f.write_str("remote"),
        }
    }
}

/// Identifies which backend to resolve
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceDescriptor {
    identifier: String,
    access_mode: AccessMode,
    handle_type: Option<String>,
}

impl ServiceDescriptor {
    pub fn new(identifier: impl Into<String>, access_mode: AccessMode) -> Self {
        Self {
            identifier: identifier.into(),
            access_mode,
            handle_type: None,
        }
    }

    pub fn local(identifier: impl Into<String>) -> Self {
        Self::new(identifier, AccessMode::Local)
    }

    pub fn remote(identifier: impl Into<String>) -> Self {
        Self::new(identifier, AccessMode::Remote)
    }

    /// Require the resolved handle to be of this type
    pub fn with_handle_type(mut self, handle_type: impl Into<String>) -> Self {
        self.handle_type = Some(handle_type.into());
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn access_mode(&self) -> AccessMode {
        self.access_mode
    }

    pub fn handle_type(&self) -> Option<&str> {
        self.handle_type.as_deref()
    }
}

impl fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.identifier, self.access_mode)
    }
}

/// Produces backend instances for one service
pub trait FactoryHandle: Send + Sync {
    /// Type of the handle, checked against [`ServiceDescriptor::handle_type`]
    fn handle_type(&self) -> &str;

    /// Build a backend from positional construction arguments
    fn create(&self, args: &[Value]) -> Result<Arc<dyn Backend>, Failure>;
}

/// Resolves a service descriptor to a factory handle
pub trait ResourceLocator: Send + Sync {
    fn lookup(&self, service: &ServiceDescriptor) -> Result<Arc<dyn FactoryHandle>, LocatorError>;
}

/// Failures reported by a resource locator
#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("Nothing is bound to '{0}'")]
    NotBound(String),

    #[error("'{name}' is not bound for {mode} access")]
    AccessModeUnavailable { name: String, mode: AccessMode },

    #[error("Handle bound to '{name}' has type {found}, expected {expected}")]
    HandleTypeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error("Locator unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_builders() {
        let service = ServiceDescriptor::remote("accounts/Ledger").with_handle_type("LedgerHome");

        assert_eq!(service.identifier(), "accounts/Ledger");
        assert_eq!(service.access_mode(), AccessMode::Remote);
        assert_eq!(service.handle_type(), Some("LedgerHome"));
        assert_eq!(service.to_string(), "accounts/Ledger (remote)");
        assert_eq!(ServiceDescriptor::local("x").handle_type(), None);
    }

    #[test]
    fn test_access_mode_serialization() {
        assert_eq!(serde_json::to_string(&AccessMode::Local).unwrap(), "\"local\"");
        let mode: AccessMode = serde_json::from_str("\"remote\"").unwrap();
        assert_eq!(mode, AccessMode::Remote);
    }

    #[test]
    fn test_error_messages() {
        let err = LocatorError::HandleTypeMismatch {
            name: "ejb/Ledger".to_string(),
            expected: "LedgerHome".to_string(),
            found: "AuditHome".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Handle bound to 'ejb/Ledger' has type AuditHome, expected LedgerHome"
        );
    }
}
