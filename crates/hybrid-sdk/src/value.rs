//! Value: the dynamically-typed currency of the bridge
//!
//! Everything a bridged member receives from or hands back to the scripting
//! runtime is a `Value`. Primitives are stored inline; strings, functions and
//! host objects are reference-counted so cloning a `Value` is always cheap.

use std::fmt;
use std::sync::Arc;

use crate::function::FunctionHandle;
use crate::object::HostObject;

/// A dynamically-typed script value.
#[derive(Clone, Default)]
pub enum Value {
    /// The absent value (what an unknown property resolves to)
    #[default]
    Undefined,
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Number (scripts only know doubles)
    Number(f64),
    /// Immutable string
    String(Arc<str>),
    /// Callable handle materialized for a runtime
    Function(FunctionHandle),
    /// Another native object exposed through the host-object protocol
    Object(Arc<dyn HostObject>),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    /// Wrap a host object
    pub fn object(object: Arc<dyn HostObject>) -> Self {
        Value::Object(object)
    }

    /// Check if value is undefined
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check if value is null or undefined
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Extract boolean value
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract number value
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrow string contents
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow function handle
    #[inline]
    pub fn as_function(&self) -> Option<&FunctionHandle> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Borrow host object
    #[inline]
    pub fn as_object(&self) -> Option<&Arc<dyn HostObject>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Script-facing type name, used in conversion errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::Object(_) => "object",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            // Identity, like script object equality
            (Value::Object(a), Value::Object(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Value::Undefined"),
            Value::Null => write!(f, "Value::Null"),
            Value::Bool(b) => write!(f, "Value::Bool({})", b),
            Value::Number(n) => write!(f, "Value::Number({})", n),
            Value::String(s) => write!(f, "Value::String({:?})", s),
            Value::Function(func) => write!(f, "Value::Function({:?})", func),
            Value::Object(o) => write!(f, "Value::Object({})", o.display_name()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<FunctionHandle> for Value {
    fn from(f: FunctionHandle) -> Self {
        Value::Function(f)
    }
}
