//! Per-runtime cache of materialized method handles
//!
//! Materializing a function object for a method is comparatively expensive
//! (runtime function-object construction, arity binding), so each bridged
//! object keeps the handles it created, bucketed by runtime.

use std::sync::Arc;

use hybrid_sdk::{FunctionHandle, RuntimeId};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Slot for one `(runtime, name)` pair; filled exactly once
type Slot = Arc<OnceCell<FunctionHandle>>;

/// Thread-safe cache of function handles keyed by `(runtime, member name)`.
///
/// The map lock is never held while a factory runs: concurrent misses on the
/// same key share one slot and block on it, misses on different keys
/// proceed independently.
pub struct FunctionCache {
    /// Runtime ID → member name → handle slot
    buckets: RwLock<FxHashMap<RuntimeId, FxHashMap<Box<str>, Slot>>>,
}

impl FunctionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(FxHashMap::default()),
        }
    }

    /// Look up a cached handle
    pub fn get(&self, runtime: RuntimeId, name: &str) -> Option<FunctionHandle> {
        let buckets = self.buckets.read();
        buckets.get(&runtime)?.get(name)?.get().cloned()
    }

    /// Return the cached handle, or build it with `factory` and cache it.
    ///
    /// `factory` runs at most once per key, even under concurrent misses.
    pub fn get_or_create(
        &self,
        runtime: RuntimeId,
        name: &str,
        factory: impl FnOnce() -> FunctionHandle,
    ) -> FunctionHandle {
        let slot = self.slot(runtime, name);
        slot.get_or_init(factory).clone()
    }

    fn slot(&self, runtime: RuntimeId, name: &str) -> Slot {
        {
            let buckets = self.buckets.read();
            if let Some(slot) = buckets.get(&runtime).and_then(|bucket| bucket.get(name)) {
                return slot.clone();
            }
        }

        let mut buckets = self.buckets.write();
        buckets
            .entry(runtime)
            .or_default()
            .entry(name.into())
            .or_default()
            .clone()
    }

    /// Drop every handle created for `runtime`.
    ///
    /// Returns the number of entries removed. Dropping a handle only
    /// releases the bridge's reference; no runtime code runs.
    pub fn evict_runtime(&self, runtime: RuntimeId) -> usize {
        let removed = self.buckets.write().remove(&runtime);
        removed.map_or(0, |bucket| bucket.len())
    }

    /// Keep only the buckets whose runtime satisfies `keep`.
    ///
    /// Returns the number of buckets dropped.
    pub fn retain_runtimes(&self, mut keep: impl FnMut(RuntimeId) -> bool) -> usize {
        let mut buckets = self.buckets.write();
        let before = buckets.len();
        buckets.retain(|runtime, _| keep(*runtime));
        before - buckets.len()
    }

    /// Number of cached entries for `runtime`
    pub fn len_for(&self, runtime: RuntimeId) -> usize {
        self.buckets.read().get(&runtime).map_or(0, |bucket| bucket.len())
    }

    /// Number of runtimes with a bucket
    pub fn runtime_count(&self) -> usize {
        self.buckets.read().len()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.buckets.read().is_empty()
    }

    /// Drop everything
    pub fn clear(&self) {
        self.buckets.write().clear();
    }
}

impl Default for FunctionCache {
    fn default() -> Self {
        Self::new()
    }
}
