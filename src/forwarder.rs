//! Per-delegate call forwarding
//!
//! An [`InvocationForwarder`] owns exactly one backend instance and turns a
//! named call with positional arguments into a call on the backend method
//! with the same name and a compatible argument shape.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::backend::Backend;
use crate::error::{DelegateError, Result};
use crate::interface::Value;
use crate::translator::ErrorTranslator;

pub struct InvocationForwarder {
    backend: Arc<dyn Backend>,
    translator: Arc<dyn ErrorTranslator>,
    retired: AtomicBool,
}

impl InvocationForwarder {
    pub fn new(backend: Arc<dyn Backend>, translator: Arc<dyn ErrorTranslator>) -> Self {
        Self {
            backend,
            translator,
            retired: AtomicBool::new(false),
        }
    }

    /// Forward a call to the backend.
    ///
    /// Selection is exact name plus compatible argument shape, first declared
    /// match wins. Lookup and access problems are reported as they are;
    /// only failures raised by the backend method pass through the translator.
    pub fn forward(&self, method: &str, args: &[Value]) -> Result<Value> {
        let sig = self
            .backend
            .find_method(method, args)
            .ok_or_else(|| DelegateError::NoSuchBackendMethod {
                backend: self.backend.type_name().to_string(),
                method: method.to_string(),
                arity: args.len(),
            })?;

        if sig.is_restricted() {
            return Err(DelegateError::AccessDenied {
                backend: self.backend.type_name().to_string(),
                method: sig.to_string(),
            });
        }

        tracing::trace!(backend = self.backend.type_name(), method = %sig, "forwarding call");

        self.backend.invoke(sig, args).map_err(|failure| {
            let translated = self.translator.convert(failure);
            tracing::debug!(
                backend = self.backend.type_name(),
                method = %sig,
                failure = %translated,
                "backend call failed"
            );
            DelegateError::Business(translated)
        })
    }

    /// The backend this forwarder owns
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    /// Record retirement; returns whether it was already recorded
    pub(crate) fn mark_retired(&self) -> bool {
        self.retired.swap(true, Ordering::AcqRel)
    }
}

impl fmt::Debug for InvocationForwarder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationForwarder")
            .field("backend", &self.backend.type_name())
            .field("retired", &self.is_retired())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ServiceObject;
    use crate::failure::{Failure, FailureKind};
    use crate::interface::ValueKind;
    use crate::translator::{AccessNormalizer, WrapAll};
    use serde_json::json;

    fn forwarder(translator: Arc<dyn ErrorTranslator>) -> InvocationForwarder {
        let backend = ServiceObject::new("LedgerBean")
            .method("balance", [], |_| Ok(json!(42)))
            .method("post", [ValueKind::Integer], |_| Ok(Value::Null))
            .method("overdraw", [], |_| {
                Err(Failure::remote_access("", Failure::unchecked("overdrawn")))
            })
            .method("audit", [], |_| Err(Failure::checked("audit unavailable")))
            .restricted_method("purge", [], |_| Ok(Value::Null));
        InvocationForwarder::new(Arc::new(backend), translator)
    }

    #[test]
    fn test_forward_returns_backend_result() {
        let fwd = forwarder(Arc::new(AccessNormalizer));
        assert_eq!(fwd.forward("balance", &[]).unwrap(), json!(42));
        assert_eq!(fwd.forward("post", &[json!(10)]).unwrap(), Value::Null);
    }

    #[test]
    fn test_missing_method_is_not_translated() {
        let fwd = forwarder(Arc::new(WrapAll));

        let err = fwd.forward("close", &[]).unwrap_err();
        assert!(matches!(
            err,
            DelegateError::NoSuchBackendMethod { ref method, arity: 0, .. } if method == "close"
        ));

        let err = fwd.forward("post", &[json!("ten")]).unwrap_err();
        assert!(matches!(err, DelegateError::NoSuchBackendMethod { arity: 1, .. }));
    }

    #[test]
    fn test_restricted_method_is_access_denied() {
        let fwd = forwarder(Arc::new(WrapAll));
        let err = fwd.forward("purge", &[]).unwrap_err();
        assert!(matches!(err, DelegateError::AccessDenied { .. }));
    }

    #[test]
    fn test_backend_failure_is_translated() {
        let fwd = forwarder(Arc::new(AccessNormalizer));
        let failure = fwd.forward("overdraw", &[]).unwrap_err().into_business().unwrap();
        assert_eq!(failure.kind(), FailureKind::Unchecked);
        assert_eq!(failure.message(), "overdrawn");

        let fwd = forwarder(Arc::new(WrapAll));
        let failure = fwd.forward("audit", &[]).unwrap_err().into_business().unwrap();
        assert_eq!(failure.kind(), FailureKind::Unchecked);
        assert_eq!(failure.cause().unwrap().message(), "audit unavailable");
    }

    #[test]
    fn test_retirement_flag() {
        let fwd = forwarder(Arc::new(WrapAll));
        assert!(!fwd.is_retired());
        assert!(!fwd.mark_retired());
        assert!(fwd.mark_retired());
        assert!(fwd.is_retired());
    }
}
