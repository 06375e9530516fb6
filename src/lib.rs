/*!
 * dyndelegate - Dynamic delegates for located services
 *
 * Implements a caller-described interface at runtime by forwarding every
 * call to one backend instance obtained through a resource locator:
 * - Interface descriptors checked against backends before use
 * - Pluggable resource locators with local and remote access modes
 * - Failure translation (wrap-all or access-wrapper normalization)
 * - Backend recovery and retirement through the owning factory
 * - TOML configuration and tracing-based logging
 */

pub mod backend;
pub mod config;
pub mod delegate;
pub mod error;
pub mod factory;
pub mod failure;
pub mod forwarder;
pub mod interface;
pub mod locator;
pub mod logging;
pub mod translator;

// Re-export commonly used types
pub use backend::{Backend, ServiceObject};
pub use config::{ConfigError, FactoryConfig, LogLevel};
pub use delegate::{Delegate, DelegateInterface, DelegateState, RetirementPolicy};
pub use error::{DelegateError, ErrorCategory, Result};
pub use factory::DelegateFactory;
pub use failure::{Failure, FailureKind};
pub use forwarder::InvocationForwarder;
pub use interface::{InterfaceSpec, MethodSig, TypeKind, Value, ValueKind};
pub use locator::{
    AccessMode, DirectoryLocator, FactoryHandle, Home, LocatorError, ResourceLocator,
    ServiceDescriptor,
};
pub use translator::{AccessNormalizer, ErrorTranslator, TranslatorPolicy, WrapAll};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
