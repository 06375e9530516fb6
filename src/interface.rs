/*!
 * Interface descriptors: method signatures and parameter shapes
 *
 * A delegate's target interface is described explicitly as a set of method
 * signatures instead of being discovered through reflection.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dynamic argument and result representation.
///
/// `Value::Null` doubles as the no-result (void) return.
pub use serde_json::Value;

/// Shape of a single parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Accepts every value
    Any,
    Null,
    Bool,
    /// Whole numbers only
    Integer,
    /// Any JSON number, whole or fractional
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// The most specific kind describing `value`
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(n) if n.is_i64() || n.is_u64() => ValueKind::Integer,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Whether a parameter of this kind can receive `value`
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ValueKind::Any => true,
            ValueKind::Number => value.is_number(),
            other => *other == Self::of(value),
        }
    }

    /// Same arity, and every argument accepted by the parameter at its position
    pub fn accepts_all(params: &[ValueKind], args: &[Value]) -> bool {
        params.len() == args.len() && params.iter().zip(args).all(|(kind, arg)| kind.accepts(arg))
    }

    /// Whether a parameter of this kind can receive everything a parameter
    /// of kind `other` receives
    pub fn accepts_kind(&self, other: ValueKind) -> bool {
        match (self, other) {
            (ValueKind::Any, _) => true,
            (ValueKind::Number, ValueKind::Integer) => true,
            (a, b) => *a == b,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Any => "any",
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature of one method: name plus positional parameter shapes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSig {
    name: String,
    params: Vec<ValueKind>,
    restricted: bool,
}

impl MethodSig {
    pub fn new(name: impl Into<String>, params: impl IntoIterator<Item = ValueKind>) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().collect(),
            restricted: false,
        }
    }

    /// Mark the method as present but not callable from outside
    pub fn restricted(mut self) -> Self {
        self.restricted = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_restricted(&self) -> bool {
        self.restricted
    }

    /// Exact name, same arity, and every argument accepted by its parameter
    pub fn matches_call(&self, name: &str, args: &[Value]) -> bool {
        self.name == name && ValueKind::accepts_all(&self.params, args)
    }

    /// Whether this (provided) method can stand in for `required`
    pub fn satisfies(&self, required: &MethodSig) -> bool {
        self.name == required.name
            && self.params.len() == required.params.len()
            && self
                .params
                .iter()
                .zip(&required.params)
                .all(|(provided, wanted)| provided.accepts_kind(*wanted))
    }
}

impl fmt::Display for MethodSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, kind) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", kind)?;
        }
        f.write_str(")")
    }
}

/// Whether a type descriptor names an interface or a concrete type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Interface,
    Concrete,
}

/// Type descriptor for the interface a delegate implements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSpec {
    name: String,
    kind: TypeKind,
    methods: Vec<MethodSig>,
}

impl InterfaceSpec {
    /// Create an empty interface descriptor
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Interface,
            methods: Vec::new(),
        }
    }

    /// Descriptor for a concrete type; delegates cannot be built for these
    pub fn concrete(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Concrete,
            methods: Vec::new(),
        }
    }

    /// Declare a method
    pub fn method(self, name: impl Into<String>, params: impl IntoIterator<Item = ValueKind>) -> Self {
        self.with_method(MethodSig::new(name, params))
    }

    pub fn with_method(mut self, sig: MethodSig) -> Self {
        self.methods.push(sig);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn methods(&self) -> &[MethodSig] {
        &self.methods
    }

    /// Whether some declared method accepts this call
    pub fn declares_call(&self, name: &str, args: &[Value]) -> bool {
        self.methods.iter().any(|m| m.matches_call(name, args))
    }

    /// Declared methods that no signature in `provided` satisfies,
    /// rendered for error messages. Empty when the interface is satisfied.
    pub fn missing_from(&self, provided: &[MethodSig]) -> Vec<String> {
        self.methods
            .iter()
            .filter(|required| !provided.iter().any(|p| p.satisfies(required)))
            .map(|required| required.to_string())
            .collect()
    }
}
