//! Delegate construction, backend retrieval and retirement
//!
//! The [`DelegateFactory`] resolves a factory handle through its
//! [`ResourceLocator`], builds a backend from it, checks the backend against
//! the requested interface and hands back a [`Delegate`] routed through a
//! fresh [`InvocationForwarder`].
//!
//! # Example
//!
//! ```
//! use dyndelegate::backend::{Backend, ServiceObject};
//! use dyndelegate::locator::{AccessMode, DirectoryLocator, Home};
//! use dyndelegate::{AccessNormalizer, DelegateFactory, InterfaceSpec};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let locator = Arc::new(DirectoryLocator::new());
//! locator.bind(
//!     "accounts/Ledger",
//!     AccessMode::Remote,
//!     Arc::new(Home::new("LedgerHome").create_with([], |_| {
//!         let bean = ServiceObject::new("LedgerBean").method("balance", [], |_| Ok(json!(42)));
//!         Ok(Arc::new(bean) as Arc<dyn Backend>)
//!     })),
//! );
//!
//! let factory = DelegateFactory::new(locator, Arc::new(AccessNormalizer));
//! let ledger = InterfaceSpec::new("Ledger").method("balance", []);
//! let delegate = factory.create_remote("accounts/Ledger", &ledger, &[]).unwrap();
//! assert_eq!(delegate.call("balance", &[]).unwrap(), json!(42));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::backend::{Backend, REMOVE_METHOD};
use crate::config::FactoryConfig;
use crate::delegate::{Delegate, DelegateInterface, FactoryToken, RetirementPolicy};
use crate::error::{DelegateError, Result};
use crate::forwarder::InvocationForwarder;
use crate::interface::{InterfaceSpec, Value};
use crate::locator::{DirectoryLocator, ResourceLocator, ServiceDescriptor};
use crate::translator::{AccessNormalizer, ErrorTranslator};

/// Builds delegates and manages their backends
///
/// Configuration is instance scoped: factories with different locators,
/// translators or retirement policies coexist. Changing the configuration
/// only affects delegates created afterwards.
pub struct DelegateFactory {
    locator: Arc<dyn ResourceLocator>,
    translator: Arc<dyn ErrorTranslator>,
    retirement: RetirementPolicy,
    token: FactoryToken,
}

impl DelegateFactory {
    pub fn new(locator: Arc<dyn ResourceLocator>, translator: Arc<dyn ErrorTranslator>) -> Self {
        Self {
            locator,
            translator,
            retirement: RetirementPolicy::default(),
            token: FactoryToken::fresh(),
        }
    }

    /// Factory using the translator and retirement policy from `config`
    pub fn from_config(config: &FactoryConfig, locator: Arc<dyn ResourceLocator>) -> Self {
        let mut factory = Self::new(locator, config.translator.into_translator());
        factory.retirement = config.retirement;
        factory
    }

    pub fn set_translator(&mut self, translator: Arc<dyn ErrorTranslator>) {
        self.translator = translator;
    }

    pub fn set_locator(&mut self, locator: Arc<dyn ResourceLocator>) {
        self.locator = locator;
    }

    pub fn set_retirement_policy(&mut self, retirement: RetirementPolicy) {
        self.retirement = retirement;
    }

    pub fn retirement_policy(&self) -> RetirementPolicy {
        self.retirement
    }

    /// Build a delegate implementing `interface` for `service`.
    ///
    /// `args` are passed positionally to the handle's construction entry
    /// point accepting that shape. Exactly one backend is constructed; it is
    /// checked against `interface` before the delegate is returned.
    pub fn create_delegate(
        &self,
        service: &ServiceDescriptor,
        interface: &InterfaceSpec,
        args: &[Value],
    ) -> Result<Delegate> {
        if !interface.is_interface() {
            return Err(DelegateError::Configuration(format!(
                "The specified type '{}' must be an interface",
                interface.name()
            )));
        }

        let handle = self
            .locator
            .lookup(service)
            .map_err(|source| DelegateError::Lookup {
                service: service.to_string(),
                source,
            })?;

        let backend = handle.create(args).map_err(|source| DelegateError::Construction {
            service: service.to_string(),
            source,
        })?;

        if !backend.satisfies(interface) {
            return Err(DelegateError::InterfaceMismatch {
                service: service.identifier().to_string(),
                interface: interface.name().to_string(),
                missing: interface.missing_from(backend.signatures()),
            });
        }

        tracing::debug!(
            service = %service,
            interface = interface.name(),
            backend = backend.type_name(),
            "created delegate"
        );

        let forwarder = InvocationForwarder::new(backend, Arc::clone(&self.translator));
        Ok(Delegate::bind(
            interface.clone(),
            service.clone(),
            forwarder,
            self.token,
            self.retirement,
        ))
    }

    /// [`create_delegate`](Self::create_delegate) for local access
    pub fn create_local(&self, identifier: &str, interface: &InterfaceSpec, args: &[Value]) -> Result<Delegate> {
        self.create_delegate(&ServiceDescriptor::local(identifier), interface, args)
    }

    /// [`create_delegate`](Self::create_delegate) for remote access
    pub fn create_remote(&self, identifier: &str, interface: &InterfaceSpec, args: &[Value]) -> Result<Delegate> {
        self.create_delegate(&ServiceDescriptor::remote(identifier), interface, args)
    }

    /// Build a delegate and wrap it in its typed view
    pub fn create_typed<I: DelegateInterface>(&self, service: &ServiceDescriptor, args: &[Value]) -> Result<I> {
        self.create_delegate(service, &I::interface(), args)
            .map(I::from_delegate)
    }

    /// Backend bound to `candidate`, which must be a [`Delegate`] built by
    /// this factory
    pub fn get_backend(&self, candidate: &dyn Any) -> Result<Arc<dyn Backend>> {
        self.forwarder_of(candidate)
            .map(|forwarder| Arc::clone(forwarder.backend()))
    }

    /// Backend behind a typed delegate view
    pub fn backend_of<I: DelegateInterface>(&self, typed: &I) -> Result<Arc<dyn Backend>> {
        self.get_backend(typed.delegate())
    }

    /// Retire the backend behind `candidate`.
    ///
    /// Runs the backend's zero-argument `remove` operation when it has one.
    /// Whatever that operation does, including failing, retirement succeeds;
    /// its failures are neither returned nor logged. Only a `candidate` that
    /// is not one of this factory's delegates is an error.
    pub fn retire(&self, candidate: &dyn Any) -> Result<()> {
        let delegate = self.delegate_of(candidate)?;
        let forwarder = delegate.binding();

        // Under fail-fast only the first caller to claim retirement runs `remove`
        let fail_fast = delegate.retirement_policy() == RetirementPolicy::FailFast;
        if fail_fast && forwarder.mark_retired() {
            return Ok(());
        }

        let backend = forwarder.backend();
        if let Some(remove) = backend.find_method(REMOVE_METHOD, &[]) {
            if !remove.is_restricted() {
                let _ = backend.invoke(remove, &[]);
            }
        }
        if !fail_fast {
            forwarder.mark_retired();
        }

        tracing::debug!(
            service = %delegate.service(),
            backend = backend.type_name(),
            "retired delegate"
        );
        Ok(())
    }

    /// Retire a typed delegate view
    pub fn retire_typed<I: DelegateInterface>(&self, typed: &I) -> Result<()> {
        self.retire(typed.delegate())
    }

    fn forwarder_of<'a>(&self, candidate: &'a dyn Any) -> Result<&'a Arc<InvocationForwarder>> {
        self.delegate_of(candidate).map(Delegate::binding)
    }

    fn delegate_of<'a>(&self, candidate: &'a dyn Any) -> Result<&'a Delegate> {
        candidate
            .downcast_ref::<Delegate>()
            .filter(|delegate| delegate.token() == self.token)
            .ok_or(DelegateError::NotADelegate)
    }
}

impl Default for DelegateFactory {
    /// Empty [`DirectoryLocator`] with the [`AccessNormalizer`] translator
    fn default() -> Self {
        Self::new(Arc::new(DirectoryLocator::new()), Arc::new(AccessNormalizer))
    }
}

impl fmt::Debug for DelegateFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateFactory")
            .field("retirement", &self.retirement)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
