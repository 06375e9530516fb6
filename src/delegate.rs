//! Delegates: runtime implementations of a caller-described interface
//!
//! A [`Delegate`] is a dispatch record. Every method name declared on its
//! interface maps to a route that forwards to the one
//! [`InvocationForwarder`] bound at construction. Each delegate also carries
//! the token of the factory that built it, which is how the factory tells its
//! own delegates apart from arbitrary values.
//!
//! Typed wrappers implement [`DelegateInterface`]:
//!
//! ```
//! use dyndelegate::{Delegate, DelegateInterface, InterfaceSpec, Result};
//!
//! struct Ledger(Delegate);
//!
//! impl DelegateInterface for Ledger {
//!     fn interface() -> InterfaceSpec {
//!         InterfaceSpec::new("Ledger").method("balance", [])
//!     }
//!     fn from_delegate(delegate: Delegate) -> Self {
//!         Ledger(delegate)
//!     }
//!     fn delegate(&self) -> &Delegate {
//!         &self.0
//!     }
//! }
//!
//! impl Ledger {
//!     fn balance(&self) -> Result<i64> {
//!         self.0.call_as("balance", &[])
//!     }
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{DelegateError, Result};
use crate::forwarder::InvocationForwarder;
use crate::interface::{InterfaceSpec, Value};
use crate::locator::ServiceDescriptor;

/// What happens to a delegate after it is retired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RetirementPolicy {
    /// Retirement only runs the backend's `remove`; later calls still
    /// forward and retiring again runs `remove` again
    #[default]
    Advisory,

    /// Later calls fail with [`DelegateError::Retired`]; retiring again is
    /// a no-op
    FailFast,
}

/// Observable lifecycle state of a delegate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegateState {
    /// Created and forwarding
    Active,
    /// Retired through the factory
    Retired,
}

/// Identity token of one factory instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FactoryToken(u64);

impl FactoryToken {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        FactoryToken(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

type Route = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// Proxy value implementing an interface by forwarding to a backend
///
/// Clones share the same binding.
#[derive(Clone)]
pub struct Delegate {
    interface: Arc<InterfaceSpec>,
    service: ServiceDescriptor,
    routes: Arc<HashMap<String, Route>>,
    binding: Arc<InvocationForwarder>,
    token: FactoryToken,
    retirement: RetirementPolicy,
}

impl Delegate {
    pub(crate) fn bind(
        interface: InterfaceSpec,
        service: ServiceDescriptor,
        forwarder: InvocationForwarder,
        token: FactoryToken,
        retirement: RetirementPolicy,
    ) -> Self {
        let binding = Arc::new(forwarder);
        let mut routes: HashMap<String, Route> = HashMap::new();
        for sig in interface.methods() {
            if routes.contains_key(sig.name()) {
                continue;
            }
            let forwarder = Arc::clone(&binding);
            let name = sig.name().to_string();
            let route: Route = Arc::new(move |args: &[Value]| forwarder.forward(&name, args));
            routes.insert(sig.name().to_string(), route);
        }

        Self {
            interface: Arc::new(interface),
            service,
            routes: Arc::new(routes),
            binding,
            token,
            retirement,
        }
    }

    /// Invoke an interface method.
    ///
    /// The call must match a method declared on the interface; it is then
    /// routed to the backend method with the same name and argument shape.
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        if self.retirement == RetirementPolicy::FailFast && self.binding.is_retired() {
            return Err(DelegateError::Retired {
                service: self.service.identifier().to_string(),
            });
        }

        let route = self
            .routes
            .get(method)
            .filter(|_| self.interface.declares_call(method, args))
            .ok_or_else(|| DelegateError::UndeclaredMethod {
                interface: self.interface.name().to_string(),
                method: method.to_string(),
                arity: args.len(),
            })?;
        route(args)
    }

    /// Invoke an interface method and decode its result
    pub fn call_as<T: DeserializeOwned>(&self, method: &str, args: &[Value]) -> Result<T> {
        let value = self.call(method, args)?;
        serde_json::from_value(value).map_err(|source| DelegateError::ResultShape {
            method: method.to_string(),
            source,
        })
    }

    pub fn interface(&self) -> &InterfaceSpec {
        &self.interface
    }

    pub fn service(&self) -> &ServiceDescriptor {
        &self.service
    }

    pub fn retirement_policy(&self) -> RetirementPolicy {
        self.retirement
    }

    pub fn state(&self) -> DelegateState {
        if self.binding.is_retired() {
            DelegateState::Retired
        } else {
            DelegateState::Active
        }
    }

    pub(crate) fn binding(&self) -> &Arc<InvocationForwarder> {
        &self.binding
    }

    pub(crate) fn token(&self) -> FactoryToken {
        self.token
    }
}

impl fmt::Debug for Delegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate")
            .field("interface", &self.interface.name())
            .field("service", &self.service)
            .field("backend", &self.binding.backend().type_name())
            .field("state", &self.state())
            .finish()
    }
}

/// Typed view over a [`Delegate`]
pub trait DelegateInterface: Sized {
    /// Descriptor of the interface this type implements
    fn interface() -> InterfaceSpec;

    fn from_delegate(delegate: Delegate) -> Self;

    fn delegate(&self) -> &Delegate;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ServiceObject;
    use crate::interface::ValueKind;
    use crate::translator::AccessNormalizer;
    use serde_json::json;

    fn ledger(retirement: RetirementPolicy) -> Delegate {
        let backend = ServiceObject::new("LedgerBean")
            .method("balance", [], |_| Ok(json!(42)))
            .method("post", [ValueKind::Integer], |args| Ok(args[0].clone()))
            .method("close", [], |_| Ok(Value::Null));
        let interface = InterfaceSpec::new("Ledger")
            .method("balance", [])
            .method("post", [ValueKind::Integer]);
        let forwarder = InvocationForwarder::new(Arc::new(backend), Arc::new(AccessNormalizer));
        Delegate::bind(
            interface,
            ServiceDescriptor::local("accounts/Ledger"),
            forwarder,
            FactoryToken::fresh(),
            retirement,
        )
    }

    #[test]
    fn test_declared_methods_are_routed() {
        let delegate = ledger(RetirementPolicy::Advisory);
        assert_eq!(delegate.call("balance", &[]).unwrap(), json!(42));
        assert_eq!(delegate.call_as::<i64>("post", &[json!(7)]).unwrap(), 7);
    }

    #[test]
    fn test_backend_only_methods_are_not_exposed() {
        let delegate = ledger(RetirementPolicy::Advisory);
        let err = delegate.call("close", &[]).unwrap_err();
        assert!(matches!(err, DelegateError::UndeclaredMethod { ref interface, .. } if interface == "Ledger"));
    }

    #[test]
    fn test_undeclared_shape_is_rejected() {
        let delegate = ledger(RetirementPolicy::Advisory);
        let err = delegate.call("post", &[json!("seven")]).unwrap_err();
        assert!(matches!(err, DelegateError::UndeclaredMethod { arity: 1, .. }));
    }

    #[test]
    fn test_result_shape_error() {
        let delegate = ledger(RetirementPolicy::Advisory);
        let err = delegate.call_as::<String>("balance", &[]).unwrap_err();
        assert!(matches!(err, DelegateError::ResultShape { .. }));
    }

    #[test]
    fn test_clones_share_binding() {
        let delegate = ledger(RetirementPolicy::Advisory);
        let copy = delegate.clone();
        assert!(Arc::ptr_eq(delegate.binding(), copy.binding()));
        assert_eq!(delegate.token(), copy.token());
    }

    #[test]
    fn test_state_follows_binding() {
        let delegate = ledger(RetirementPolicy::FailFast);
        assert_eq!(delegate.state(), DelegateState::Active);

        delegate.binding().mark_retired();
        assert_eq!(delegate.state(), DelegateState::Retired);
        assert!(matches!(
            delegate.call("balance", &[]).unwrap_err(),
            DelegateError::Retired { .. }
        ));
    }

    #[test]
    fn test_advisory_policy_keeps_forwarding() {
        let delegate = ledger(RetirementPolicy::Advisory);
        delegate.binding().mark_retired();
        assert_eq!(delegate.call("balance", &[]).unwrap(), json!(42));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(FactoryToken::fresh(), FactoryToken::fresh());
    }
}
