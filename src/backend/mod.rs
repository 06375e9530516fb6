//! Backend abstraction: the objects delegates forward to
//!
//! A backend advertises the methods it provides as [`MethodSig`]s and executes
//! a selected method with positional [`Value`] arguments. Failures raised by a
//! method are returned as [`Failure`] values and later normalized by the
//! delegate's error translator.
//!
//! # Example
//!
//! ```
//! use dyndelegate::backend::{Backend, ServiceObject};
//! use dyndelegate::interface::MethodSig;
//! use serde_json::json;
//!
//! let ledger = ServiceObject::new("LedgerBean").method("balance", [], |_| Ok(json!(42)));
//! let sig = MethodSig::new("balance", []);
//! assert_eq!(ledger.invoke(&sig, &[]).unwrap(), json!(42));
//! ```

mod object;

pub use object::ServiceObject;

use std::sync::Arc;

use crate::failure::Failure;
use crate::interface::{InterfaceSpec, MethodSig, Value};

/// Name of the terminal operation invoked when a delegate is retired
pub const REMOVE_METHOD: &str = "remove";

/// A resolved backend instance
///
/// Implementations must be usable from any thread; any mutable state lives
/// behind the implementation's own synchronization.
pub trait Backend: Send + Sync {
    /// Type name used in diagnostics
    fn type_name(&self) -> &str;

    /// Every method this backend provides
    fn signatures(&self) -> &[MethodSig];

    /// Execute `method`, one of the signatures returned by [`Backend::signatures`]
    fn invoke(&self, method: &MethodSig, args: &[Value]) -> Result<Value, Failure>;

    /// First provided method matching the name and argument shapes
    fn find_method(&self, name: &str, args: &[Value]) -> Option<&MethodSig> {
        self.signatures().iter().find(|sig| sig.matches_call(name, args))
    }

    /// Whether every method of `interface` is provided
    fn satisfies(&self, interface: &InterfaceSpec) -> bool {
        interface.missing_from(self.signatures()).is_empty()
    }
}

/// Identity comparison of two backend handles
pub fn same_instance(a: &Arc<dyn Backend>, b: &Arc<dyn Backend>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::ValueKind;
    use serde_json::json;

    fn ledger() -> ServiceObject {
        ServiceObject::new("LedgerBean")
            .method("balance", [], |_| Ok(json!(42)))
            .method("post", [ValueKind::Integer], |args| Ok(args[0].clone()))
    }

    #[test]
    fn test_find_method() {
        let backend = ledger();
        assert_eq!(backend.find_method("post", &[json!(1)]).map(|s| s.name()), Some("post"));
        assert!(backend.find_method("post", &[json!("1")]).is_none());
        assert!(backend.find_method("close", &[]).is_none());
    }

    #[test]
    fn test_satisfies_interface() {
        let backend = ledger();
        assert!(backend.satisfies(&InterfaceSpec::new("Ledger").method("balance", [])));
        assert!(!backend.satisfies(&InterfaceSpec::new("Ledger").method("close", [])));
    }

    #[test]
    fn test_same_instance() {
        let a: Arc<dyn Backend> = Arc::new(ledger());
        let b: Arc<dyn Backend> = Arc::new(ledger());
        assert!(same_instance(&a, &Arc::clone(&a)));
        assert!(!same_instance(&a, &b));
    }
}
