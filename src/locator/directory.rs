//! In-memory naming directory
//!
//! Default [`ResourceLocator`]: handles are bound under a name per access
//! mode and looked up on every request. Nothing is cached.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::{AccessMode, FactoryHandle, LocatorError, ResourceLocator, ServiceDescriptor};

/// Naming directory mapping service identifiers to factory handles
#[derive(Default)]
pub struct DirectoryLocator {
    bindings: RwLock<HashMap<String, HashMap<AccessMode, Arc<dyn FactoryHandle>>>>,
}

impl DirectoryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handle` under `name` for the given access mode, replacing any
    /// previous binding for that mode
    pub fn bind(&self, name: impl Into<String>, mode: AccessMode, handle: Arc<dyn FactoryHandle>) {
        let name = name.into();
        tracing::debug!(name = %name, %mode, handle_type = handle.handle_type(), "binding factory handle");
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        bindings.entry(name).or_default().insert(mode, handle);
    }

    /// Bind the same handle for both local and remote access
    pub fn bind_all(&self, name: impl Into<String>, handle: Arc<dyn FactoryHandle>) {
        let name = name.into();
        self.bind(name.clone(), AccessMode::Local, Arc::clone(&handle));
        self.bind(name, AccessMode::Remote, handle);
    }

    /// Remove every binding under `name`
    pub fn unbind(&self, name: &str) -> bool {
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        bindings.remove(name).is_some()
    }

    pub fn is_bound(&self, name: &str) -> bool {
        let bindings = self.bindings.read().unwrap_or_else(PoisonError::into_inner);
        bindings.contains_key(name)
    }

    /// All bound names, sorted
    pub fn names(&self) -> Vec<String> {
        let bindings = self.bindings.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = bindings.keys().cloned().collect();
        names.sort();
        names
    }
}

impl ResourceLocator for DirectoryLocator {
    fn lookup(&self, service: &ServiceDescriptor) -> Result<Arc<dyn FactoryHandle>, LocatorError> {
        let name = service.identifier();
        let handle = {
            let bindings = self.bindings.read().unwrap_or_else(PoisonError::into_inner);
            let modes = bindings
                .get(name)
                .ok_or_else(|| LocatorError::NotBound(name.to_string()))?;
            modes
                .get(&service.access_mode())
                .cloned()
                .ok_or_else(|| LocatorError::AccessModeUnavailable {
                    name: name.to_string(),
                    mode: service.access_mode(),
                })?
        };

        if let Some(expected) = service.handle_type() {
            if handle.handle_type() != expected {
                return Err(LocatorError::HandleTypeMismatch {
                    name: name.to_string(),
                    expected: expected.to_string(),
                    found: handle.handle_type().to_string(),
                });
            }
        }

        tracing::trace!(service = %service, handle_type = handle.handle_type(), "resolved factory handle");
        Ok(handle)
    }
}
