//! Shared test runtime for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use hybrid_engine::{
    FunctionHandle, NativeFn, RuntimeContext, RuntimeId, RuntimeLease, RuntimeRegistry,
};
use parking_lot::Mutex;

/// Minimal scripting runtime: counts materializations and owns a lease in
/// the liveness registry.
pub struct ScriptRuntime {
    lease: Mutex<Option<RuntimeLease>>,
    id: RuntimeId,
    registry: Arc<RuntimeRegistry>,
    this: Weak<ScriptRuntime>,
    materialized: AtomicUsize,
}

impl ScriptRuntime {
    pub fn new(registry: &Arc<RuntimeRegistry>) -> Arc<Self> {
        let lease = registry.attach();
        Arc::new_cyclic(|this| Self {
            id: lease.id(),
            registry: Arc::clone(registry),
            lease: Mutex::new(Some(lease)),
            this: this.clone(),
            materialized: AtomicUsize::new(0),
        })
    }

    /// Tear the runtime down (drops the lease)
    pub fn destroy(&self) {
        self.lease.lock().take();
    }

    pub fn materialized(&self) -> usize {
        self.materialized.load(Ordering::SeqCst)
    }
}

impl RuntimeContext for ScriptRuntime {
    fn id(&self) -> RuntimeId {
        self.id
    }

    fn registry(&self) -> &Arc<RuntimeRegistry> {
        &self.registry
    }

    fn create_function(&self, name: &str, arity: usize, func: NativeFn) -> FunctionHandle {
        self.materialized.fetch_add(1, Ordering::SeqCst);
        FunctionHandle::new(name, arity, func)
    }

    fn to_shared(&self) -> Option<Arc<dyn RuntimeContext>> {
        self.this.upgrade().map(|rt| rt as Arc<dyn RuntimeContext>)
    }
}

/// Fresh registry plus one live runtime
pub fn setup() -> (Arc<RuntimeRegistry>, Arc<ScriptRuntime>) {
    let registry = Arc::new(RuntimeRegistry::new());
    let rt = ScriptRuntime::new(&registry);
    (registry, rt)
}
