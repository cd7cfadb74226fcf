//! Callable handles materialized for a scripting runtime

use std::fmt;
use std::sync::Arc;

use crate::context::RuntimeContext;
use crate::error::HostResult;
use crate::value::Value;

/// A native function body as seen by the runtime.
///
/// Receives the calling runtime and the positional arguments. Anything the
/// function needs beyond that (the receiver object, captured state) lives in
/// the closure.
pub type NativeFn = Arc<dyn Fn(&dyn RuntimeContext, &[Value]) -> HostResult<Value> + Send + Sync>;

struct FunctionInner {
    name: Arc<str>,
    arity: usize,
    func: NativeFn,
}

/// Runtime-callable function object.
///
/// Cloning shares the same underlying function; two handles compare equal
/// with [`FunctionHandle::ptr_eq`] only if they came from the same
/// materialization.
#[derive(Clone)]
pub struct FunctionHandle {
    inner: Arc<FunctionInner>,
}

impl FunctionHandle {
    /// Build a function object from a native body.
    pub fn new(name: impl Into<Arc<str>>, arity: usize, func: NativeFn) -> Self {
        Self {
            inner: Arc::new(FunctionInner {
                name: name.into(),
                arity,
                func,
            }),
        }
    }

    /// Build a function object from a closure
    pub fn from_fn<F>(name: impl Into<Arc<str>>, arity: usize, func: F) -> Self
    where
        F: Fn(&dyn RuntimeContext, &[Value]) -> HostResult<Value> + Send + Sync + 'static,
    {
        Self::new(name, arity, Arc::new(func))
    }

    /// Function name (the `name` property in script)
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Declared parameter count (the `length` property in script)
    pub fn arity(&self) -> usize {
        self.inner.arity
    }

    /// Invoke the function in `rt` with `args`
    #[inline]
    pub fn call(&self, rt: &dyn RuntimeContext, args: &[Value]) -> HostResult<Value> {
        (self.inner.func)(rt, args)
    }

    /// Whether both handles refer to the same function object
    pub fn ptr_eq(&self, other: &FunctionHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for FunctionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function {}/{}", self.inner.name, self.inner.arity)
    }
}
