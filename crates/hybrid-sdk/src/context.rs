//! RuntimeContext trait: the scripting runtime surface
//!
//! Defines what the bridge needs from an embedding scripting runtime. The
//! embedding provides the concrete implementation; bridged objects only ever
//! see `&dyn RuntimeContext`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::HostResult;
use crate::function::{FunctionHandle, NativeFn};
use crate::liveness::RuntimeRegistry;
use crate::value::Value;

/// Opaque identifier of one scripting runtime instance.
///
/// Caches and back-references key on this instead of holding the runtime,
/// so nothing native keeps a runtime alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuntimeId(u64);

impl RuntimeId {
    /// Allocate a fresh, process-unique identifier
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        RuntimeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap an identifier chosen by the embedding (e.g. the runtime's address)
    pub const fn from_u64(id: u64) -> Self {
        RuntimeId(id)
    }

    /// Get the raw ID value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for RuntimeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rt#{}", self.0)
    }
}

/// Abstract scripting runtime for bridged objects.
///
/// A runtime instance is single-threaded, but a process may host several at
/// once; everything per-runtime in the bridge is keyed by [`RuntimeContext::id`].
pub trait RuntimeContext: Send + Sync {
    /// Identity of this runtime instance
    fn id(&self) -> RuntimeId;

    /// Liveness table this runtime was registered in
    fn registry(&self) -> &Arc<RuntimeRegistry>;

    /// Turn a native body into a runtime function object.
    ///
    /// This is the potentially expensive "materialize" step the bridge caches.
    fn create_function(&self, name: &str, arity: usize, func: NativeFn) -> FunctionHandle {
        FunctionHandle::new(name, arity, func)
    }

    /// Default property read for names a host object does not know
    /// (prototype chain and friends). `None` means "not found".
    fn default_get(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Default property write for names a host object does not handle
    fn default_set(&self, _name: &str, _value: Value) -> HostResult<()> {
        Ok(())
    }

    /// Owned handle for callbacks that fire later from other threads.
    ///
    /// Runtimes that cannot be captured return `None`, which makes
    /// asynchronous registrations fail instead of dangling.
    fn to_shared(&self) -> Option<Arc<dyn RuntimeContext>> {
        None
    }

    /// Whether this runtime is still usable for calls
    fn is_alive(&self) -> bool {
        self.registry().is_alive(self.id())
    }
}
