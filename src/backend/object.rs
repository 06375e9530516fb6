//! Closure-backed backend built from a method table

use std::fmt;
use std::sync::Arc;

use super::Backend;
use crate::failure::Failure;
use crate::interface::{MethodSig, Value, ValueKind};

/// Method implementation stored in a [`ServiceObject`]
pub type MethodHandler = Arc<dyn Fn(&[Value]) -> Result<Value, Failure> + Send + Sync>;

/// Backend whose methods are plain closures
///
/// Overloads are allowed: several entries may share a name as long as their
/// parameter shapes differ. Handlers capture whatever state they need.
///
/// ```
/// use dyndelegate::backend::ServiceObject;
/// use dyndelegate::interface::ValueKind;
/// use serde_json::json;
///
/// let greeter = ServiceObject::new("Greeter")
///     .method("greet", [], |_| Ok(json!("hello")))
///     .method("greet", [ValueKind::String], |args| {
///         Ok(json!(format!("hello {}", args[0].as_str().unwrap_or_default())))
///     });
/// ```
#[derive(Clone)]
pub struct ServiceObject {
    type_name: String,
    signatures: Vec<MethodSig>,
    handlers: Vec<MethodHandler>,
}

impl ServiceObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            signatures: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Add a callable method
    pub fn method<F>(self, name: impl Into<String>, params: impl IntoIterator<Item = ValueKind>, handler: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, Failure> + Send + Sync + 'static,
    {
        self.with_method(MethodSig::new(name, params), handler)
    }

    /// Add a method that exists but refuses outside calls
    pub fn restricted_method<F>(
        self,
        name: impl Into<String>,
        params: impl IntoIterator<Item = ValueKind>,
        handler: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, Failure> + Send + Sync + 'static,
    {
        self.with_method(MethodSig::new(name, params).restricted(), handler)
    }

    pub fn with_method<F>(mut self, sig: MethodSig, handler: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, Failure> + Send + Sync + 'static,
    {
        self.signatures.push(sig);
        self.handlers.push(Arc::new(handler));
        self
    }
}

impl Backend for ServiceObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn signatures(&self) -> &[MethodSig] {
        &self.signatures
    }

    fn invoke(&self, method: &MethodSig, args: &[Value]) -> Result<Value, Failure> {
        let index = self
            .signatures
            .iter()
            .position(|sig| sig == method)
            .ok_or_else(|| Failure::unchecked(format!("{} does not provide {}", self.type_name, method)))?;
        (self.handlers[index])(args)
    }
}

impl fmt::Debug for ServiceObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceObject")
            .field("type_name", &self.type_name)
            .field("signatures", &self.signatures)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[test]
    fn test_overloads_dispatch_by_shape() {
        let greeter = ServiceObject::new("Greeter")
            .method("greet", [], |_| Ok(json!("hello")))
            .method("greet", [ValueKind::String], |args| {
                Ok(json!(format!("hello {}", args[0].as_str().unwrap_or_default())))
            });

        let no_args = greeter.find_method("greet", &[]).unwrap().clone();
        let one_arg = greeter.find_method("greet", &[json!("ann")]).unwrap().clone();

        assert_eq!(greeter.invoke(&no_args, &[]).unwrap(), json!("hello"));
        assert_eq!(greeter.invoke(&one_arg, &[json!("ann")]).unwrap(), json!("hello ann"));
    }

    #[test]
    fn test_handlers_share_state() {
        let total = Arc::new(AtomicI64::new(0));
        let add_total = Arc::clone(&total);
        let read_total = Arc::clone(&total);
        let counter = ServiceObject::new("Counter")
            .method("add", [ValueKind::Integer], move |args| {
                add_total.fetch_add(args[0].as_i64().unwrap_or(0), Ordering::SeqCst);
                Ok(Value::Null)
            })
            .method("total", [], move |_| Ok(json!(read_total.load(Ordering::SeqCst))));

        let add = MethodSig::new("add", [ValueKind::Integer]);
        counter.invoke(&add, &[json!(5)]).unwrap();
        counter.invoke(&add, &[json!(7)]).unwrap();

        assert_eq!(counter.invoke(&MethodSig::new("total", []), &[]).unwrap(), json!(12));
        assert_eq!(total.load(Ordering::SeqCst), 12);
    }

    #[test]
    fn test_unknown_signature_is_unchecked_failure() {
        let object = ServiceObject::new("Empty");
        let err = object.invoke(&MethodSig::new("missing", []), &[]).unwrap_err();
        assert_eq!(err.kind(), crate::failure::FailureKind::Unchecked);
    }

    #[test]
    fn test_restricted_method_is_flagged() {
        let object = ServiceObject::new("Vault").restricted_method("open", [], |_| Ok(Value::Null));
        assert!(object.signatures()[0].is_restricted());
    }
}
