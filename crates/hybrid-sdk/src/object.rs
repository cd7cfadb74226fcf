//! HostObject trait: the property-bag protocol
//!
//! The three hooks a scripting runtime calls on a native object: enumerate
//! own property names, read a property, write a property.

use crate::context::RuntimeContext;
use crate::error::HostResult;
use crate::value::Value;

/// A native object visible to the scripting runtime.
///
/// Implementations resolve unknown names through the runtime's default
/// behavior (`RuntimeContext::default_get`/`default_set`) rather than
/// failing.
pub trait HostObject: Send + Sync {
    /// Read property `name`
    fn get(&self, rt: &dyn RuntimeContext, name: &str) -> HostResult<Value>;

    /// Write property `name`
    fn set(&self, rt: &dyn RuntimeContext, name: &str, value: Value) -> HostResult<()>;

    /// Own property names, in enumeration order
    fn property_names(&self, rt: &dyn RuntimeContext) -> Vec<String>;

    /// Name used in diagnostics
    fn display_name(&self) -> &str {
        "HostObject"
    }
}
