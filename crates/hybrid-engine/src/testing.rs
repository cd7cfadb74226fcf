//! In-process runtime double for unit tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use hybrid_sdk::{
    FunctionHandle, HostResult, NativeFn, RuntimeContext, RuntimeId, RuntimeRegistry, Value,
};
use parking_lot::Mutex;

/// Records what the bridge asks of the runtime
pub(crate) struct TestRuntime {
    id: RuntimeId,
    registry: Arc<RuntimeRegistry>,
    this: Weak<TestRuntime>,
    functions_created: AtomicUsize,
    default_reads: AtomicUsize,
    default_writes: Mutex<Vec<String>>,
    destroy_on_create: AtomicBool,
}

impl TestRuntime {
    /// Create a runtime registered alive in `registry`
    pub(crate) fn new(registry: &Arc<RuntimeRegistry>) -> Arc<Self> {
        let id = RuntimeId::new();
        registry.register_runtime(id);
        Arc::new_cyclic(|this| Self {
            id,
            registry: Arc::clone(registry),
            this: this.clone(),
            functions_created: AtomicUsize::new(0),
            default_reads: AtomicUsize::new(0),
            default_writes: Mutex::new(Vec::new()),
            destroy_on_create: AtomicBool::new(false),
        })
    }

    pub(crate) fn destroy(&self) {
        self.registry.mark_destroyed(self.id);
    }

    pub(crate) fn functions_created(&self) -> usize {
        self.functions_created.load(Ordering::SeqCst)
    }

    /// Tear the runtime down from inside its next `create_function`
    pub(crate) fn destroy_during_next_function(&self) {
        self.destroy_on_create.store(true, Ordering::SeqCst);
    }

    pub(crate) fn default_reads(&self) -> usize {
        self.default_reads.load(Ordering::SeqCst)
    }

    pub(crate) fn default_writes(&self) -> Vec<String> {
        self.default_writes.lock().clone()
    }
}

impl RuntimeContext for TestRuntime {
    fn id(&self) -> RuntimeId {
        self.id
    }

    fn registry(&self) -> &Arc<RuntimeRegistry> {
        &self.registry
    }

    fn create_function(&self, name: &str, arity: usize, func: NativeFn) -> FunctionHandle {
        self.functions_created.fetch_add(1, Ordering::SeqCst);
        if self.destroy_on_create.swap(false, Ordering::SeqCst) {
            self.destroy();
        }
        FunctionHandle::new(name, arity, func)
    }

    fn default_get(&self, name: &str) -> Option<Value> {
        self.default_reads.fetch_add(1, Ordering::SeqCst);
        (name == "constructor").then(|| Value::from("TestRuntime.prototype"))
    }

    fn default_set(&self, name: &str, _value: Value) -> HostResult<()> {
        self.default_writes.lock().push(name.to_string());
        Ok(())
    }

    fn to_shared(&self) -> Option<Arc<dyn RuntimeContext>> {
        self.this.upgrade().map(|rt| rt as Arc<dyn RuntimeContext>)
    }
}
