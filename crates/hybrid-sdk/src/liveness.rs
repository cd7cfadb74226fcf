//! Runtime liveness registry
//!
//! Process-wide record of which scripting runtimes may still be called
//! into. Native code running on any thread (frame ticks, loader
//! completions) checks this right before invoking into a runtime, so a torn
//! down runtime is never touched.
//!
//! Records are never removed: an identifier goes alive → dead exactly once,
//! and re-registering a dead identifier keeps it dead.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::context::RuntimeId;

/// Liveness table for scripting runtimes.
///
/// Construct one per process (or per embedding) and share it as
/// `Arc<RuntimeRegistry>`; runtime owners call [`register_runtime`] on
/// creation and [`mark_destroyed`] on teardown, or hold a [`RuntimeLease`]
/// which does both.
///
/// [`register_runtime`]: RuntimeRegistry::register_runtime
/// [`mark_destroyed`]: RuntimeRegistry::mark_destroyed
pub struct RuntimeRegistry {
    /// Runtime ID → alive flag
    runtimes: DashMap<RuntimeId, bool>,
}

impl RuntimeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            runtimes: DashMap::new(),
        }
    }

    /// Mark `id` alive.
    ///
    /// Idempotent. Returns the resulting state, which is `false` if `id` was
    /// already destroyed.
    pub fn register_runtime(&self, id: RuntimeId) -> bool {
        let alive = *self.runtimes.entry(id).or_insert(true);
        if alive {
            tracing::debug!(runtime = %id, "runtime registered");
        } else {
            tracing::warn!(runtime = %id, "ignoring registration of a destroyed runtime");
        }
        alive
    }

    /// Flip `id` to dead, irreversibly.
    ///
    /// Returns `true` only for the call that performed the flip. Unknown
    /// identifiers are recorded as dead so they can never come alive later.
    pub fn mark_destroyed(&self, id: RuntimeId) -> bool {
        let flipped = match self.runtimes.entry(id) {
            Entry::Occupied(mut entry) => std::mem::replace(entry.get_mut(), false),
            Entry::Vacant(entry) => {
                entry.insert(false);
                false
            }
        };
        if flipped {
            tracing::debug!(runtime = %id, "runtime destroyed");
        }
        flipped
    }

    /// Whether `id` is registered and not yet destroyed
    #[inline]
    pub fn is_alive(&self, id: RuntimeId) -> bool {
        self.runtimes.get(&id).map(|alive| *alive).unwrap_or(false)
    }

    /// Register a fresh runtime and get a lease that destroys it on drop
    pub fn attach(self: &Arc<Self>) -> RuntimeLease {
        self.attach_id(RuntimeId::new())
    }

    /// Register `id` and get a lease that destroys it on drop
    pub fn attach_id(self: &Arc<Self>, id: RuntimeId) -> RuntimeLease {
        self.register_runtime(id);
        RuntimeLease {
            id,
            registry: Arc::clone(self),
        }
    }

    /// Number of runtimes ever recorded (alive or dead)
    pub fn len(&self) -> usize {
        self.runtimes.len()
    }

    /// Check if no runtime was ever recorded
    pub fn is_empty(&self) -> bool {
        self.runtimes.is_empty()
    }

    /// Number of runtimes currently alive
    pub fn alive_count(&self) -> usize {
        self.runtimes.iter().filter(|entry| *entry.value()).count()
    }

    /// All recorded runtime IDs
    pub fn all_ids(&self) -> Vec<RuntimeId> {
        self.runtimes.iter().map(|entry| *entry.key()).collect()
    }
}

impl Default for RuntimeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle hook for one runtime: registered on creation, destroyed on drop.
///
/// Owners of a runtime instance keep the lease next to it, so teardown can't
/// forget the `mark_destroyed` call.
pub struct RuntimeLease {
    id: RuntimeId,
    registry: Arc<RuntimeRegistry>,
}

impl RuntimeLease {
    /// The leased runtime's identifier
    pub fn id(&self) -> RuntimeId {
        self.id
    }

    /// Registry the runtime lives in
    pub fn registry(&self) -> &Arc<RuntimeRegistry> {
        &self.registry
    }
}

impl Drop for RuntimeLease {
    fn drop(&mut self) {
        self.registry.mark_destroyed(self.id);
    }
}

/// A callback tied to the runtime it calls into.
///
/// [`RuntimeBound::invoke`] runs the callback only while that runtime is
/// alive, and silently skips it otherwise: the caller is usually a
/// background thread with nothing useful to do about a dead runtime.
pub struct RuntimeBound<F> {
    runtime: RuntimeId,
    registry: Arc<RuntimeRegistry>,
    callback: F,
}

impl<F> RuntimeBound<F> {
    /// Bind `callback` to `runtime`
    pub fn new(runtime: RuntimeId, registry: Arc<RuntimeRegistry>, callback: F) -> Self {
        Self {
            runtime,
            registry,
            callback,
        }
    }

    /// The runtime this callback targets
    pub fn runtime(&self) -> RuntimeId {
        self.runtime
    }

    /// Whether the target runtime is still alive
    pub fn is_alive(&self) -> bool {
        self.registry.is_alive(self.runtime)
    }

    /// Run `f` with the callback if the runtime is alive.
    ///
    /// Returns `None` when the call was skipped.
    pub fn invoke<R>(&self, f: impl FnOnce(&F) -> R) -> Option<R> {
        if !self.is_alive() {
            tracing::trace!(runtime = %self.runtime, "skipping call into destroyed runtime");
            return None;
        }
        Some(f(&self.callback))
    }
}
