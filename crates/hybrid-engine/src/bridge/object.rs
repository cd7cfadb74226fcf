//! Bridged objects: the host-object dispatch protocol
//!
//! A native type implements [`HybridObject`] to declare its script-visible
//! members once. Wrapping it in a [`BridgedObject`] gives it everything the
//! scripting runtime needs:
//!
//! - lazy, exactly-once member registration on first touch from any runtime
//! - property resolution: getter → cached method → method → `toString` →
//!   runtime default
//! - per-runtime caching of materialized method handles
//! - a non-owning back-reference to the runtime that triggered registration
//!
//! Member bodies never run under a bridge lock, so getters and methods may
//! freely access other bridged objects (or this one).

use std::ops::Deref;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use hybrid_sdk::{
    panic_message, FunctionHandle, HostError, HostObject, HostResult, NativeFn, RuntimeBound,
    RuntimeContext, RuntimeId, RuntimeRegistry, Value,
};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::cache::FunctionCache;
use super::members::{MemberTable, MethodFn};

/// Reserved member name synthesized for every bridged object
pub const TO_STRING: &str = "toString";

/// A native type exposed to scripts.
///
/// `register_members` is the only glue an implementor writes; it is called
/// at most once per object, lazily, the first time any runtime touches it.
/// It must not access the object through the bridge itself.
pub trait HybridObject: Send + Sync + Sized + 'static {
    /// Display name used by `toString` and diagnostics
    fn name(&self) -> &str;

    /// Populate `members` with this object's methods, getters and setters
    fn register_members(&self, members: &mut MemberTable<Self>);
}

/// The runtime that first triggered registration (non-owning).
struct CreationRuntime {
    id: RuntimeId,
    registry: Arc<RuntimeRegistry>,
}

/// Run a member body, turning a panic into [`HostError::Panic`]
fn guarded<R>(object: &str, member: &str, body: impl FnOnce() -> HostResult<R>) -> HostResult<R> {
    catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        tracing::error!(object, member, panic = %message, "bridged member panicked");
        Err(HostError::Panic(message))
    })
}

/// Per-display-name instance counters for memory diagnostics
static INSTANCE_IDS: Lazy<Mutex<FxHashMap<String, u32>>> =
    Lazy::new(|| Mutex::new(FxHashMap::default()));

fn next_instance_id(name: &str) -> u32 {
    let mut ids = INSTANCE_IDS.lock();
    let counter = ids.entry(name.to_string()).or_insert(0);
    *counter += 1;
    *counter
}

/// A native object made visible to scripting runtimes.
///
/// Always handled as `Arc<BridgedObject<T>>`; materialized methods hold a
/// weak reference back, so script function objects never keep the native
/// object alive on their own.
pub struct BridgedObject<T: HybridObject> {
    inner: T,
    /// Registered members; set exactly once
    members: OnceCell<MemberTable<T>>,
    /// Runtime that triggered registration
    creation: OnceCell<CreationRuntime>,
    /// Materialized method handles per runtime
    cache: FunctionCache,
    /// Self reference handed to materialized methods
    this: Weak<Self>,
    /// Diagnostics instance number
    instance_id: u32,
}

impl<T: HybridObject> BridgedObject<T> {
    /// Wrap `inner` for bridging
    pub fn new(inner: T) -> Arc<Self> {
        let instance_id = next_instance_id(inner.name());
        tracing::trace!(object = inner.name(), instance = instance_id, "creating bridged object");
        Arc::new_cyclic(|this| Self {
            inner,
            members: OnceCell::new(),
            creation: OnceCell::new(),
            cache: FunctionCache::new(),
            this: this.clone(),
            instance_id,
        })
    }

    /// Display name
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Diagnostics instance number (per display name, starting at 1)
    pub fn instance_id(&self) -> u32 {
        self.instance_id
    }

    /// The wrapped native value
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Run registration if no runtime has triggered it yet.
    ///
    /// The first caller records `rt` as the creation runtime and runs
    /// `register_members`; concurrent first callers block until the table
    /// is populated. Later calls are no-ops.
    pub fn ensure_registered(&self, rt: &dyn RuntimeContext) -> &MemberTable<T> {
        self.members.get_or_init(|| {
            let mut members = MemberTable::new(self.inner.name());
            self.inner.register_members(&mut members);
            let recorded = self.creation.set(CreationRuntime {
                id: rt.id(),
                registry: Arc::clone(rt.registry()),
            });
            debug_assert!(recorded.is_ok(), "{} registered twice", self.inner.name());
            tracing::trace!(
                object = self.inner.name(),
                runtime = %rt.id(),
                members = members.len(),
                "registered members"
            );
            members
        })
    }

    /// Whether registration has run
    pub fn is_registered(&self) -> bool {
        self.members.get().is_some()
    }

    /// Check that `rt` is alive; if not, drop its cached handles without
    /// calling into it.
    fn check_alive(&self, rt: &dyn RuntimeContext, action: &str) -> bool {
        let runtime = rt.id();
        if rt.registry().is_alive(runtime) {
            return true;
        }
        let evicted = self.cache.evict_runtime(runtime);
        tracing::trace!(object = self.name(), %runtime, evicted, action, "destroyed runtime skipped");
        false
    }

    /// Resolve member `name` for `rt`.
    ///
    /// Returns `Ok(None)` when the name is unknown (the caller falls back to
    /// the runtime's default resolution), and also when `rt` is already
    /// destroyed, in which case its cached handles are dropped untouched.
    pub fn get_member(&self, rt: &dyn RuntimeContext, name: &str) -> HostResult<Option<Value>> {
        if !self.check_alive(rt, "get") {
            return Ok(None);
        }
        let runtime = rt.id();
        let members = self.ensure_registered(rt);

        if let Some(getter) = members.getter_fn(name) {
            return guarded(self.name(), name, || getter(&self.inner, rt)).map(Some);
        }

        if let Some(function) = self.cache.get(runtime, name) {
            return Ok(Some(Value::Function(function)));
        }

        if let Some((arity, method)) = members.method_fn(name) {
            // Buckets of runtimes that died since the last miss
            if self.cache.runtime_count() > 1 {
                self.purge_dead_in(rt.registry());
            }
            let function = self.cache.get_or_create(runtime, name, || {
                tracing::trace!(object = self.name(), %runtime, member = name, "materializing method");
                rt.create_function(name, arity, self.bind_method(name, arity, method.clone()))
            });
            // The runtime may have been torn down while materializing
            if !self.check_alive(rt, "materialize") {
                return Ok(None);
            }
            return Ok(Some(Value::Function(function)));
        }

        if name == TO_STRING {
            return Ok(Some(Value::Function(self.to_string_function(rt))));
        }

        Ok(None)
    }

    /// Assign member `name` through its setter.
    ///
    /// Returns `Ok(false)` if no setter is registered under `name`, or if
    /// `rt` is destroyed (nothing is written then).
    pub fn set_member(&self, rt: &dyn RuntimeContext, name: &str, value: Value) -> HostResult<bool> {
        if !self.check_alive(rt, "set") {
            return Ok(false);
        }
        let members = self.ensure_registered(rt);
        match members.setter_fn(name) {
            Some(setter) => {
                guarded(self.name(), name, || setter(&self.inner, rt, value))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// All member names: methods, then getters, then setters.
    ///
    /// Empty for a destroyed runtime.
    pub fn member_names(&self, rt: &dyn RuntimeContext) -> Vec<String> {
        if !self.check_alive(rt, "enumerate") {
            return Vec::new();
        }
        self.ensure_registered(rt).names()
    }

    /// `Name { "a", "b" }` rendering used by the synthesized `toString`
    pub fn describe(&self, rt: &dyn RuntimeContext) -> String {
        let names = self.member_names(rt);
        let mut result = format!("{} {{ ", self.name());
        for (i, name) in names.iter().enumerate() {
            let suffix = if i + 1 < names.len() { ", " } else { " " };
            result.push('"');
            result.push_str(name);
            result.push('"');
            result.push_str(suffix);
        }
        result.push('}');
        result
    }

    /// Whether the runtime that triggered registration is still alive.
    ///
    /// `false` before registration.
    pub fn is_owning_runtime_alive(&self) -> bool {
        self.creation
            .get()
            .is_some_and(|creation| creation.registry.is_alive(creation.id))
    }

    /// The runtime that triggered registration, if any
    pub fn creation_runtime(&self) -> Option<RuntimeId> {
        self.creation.get().map(|creation| creation.id)
    }

    /// Tie `callback` to the creation runtime so it is skipped once that
    /// runtime is gone. `None` before registration.
    pub fn bind_to_creation_runtime<F>(&self, callback: F) -> Option<RuntimeBound<F>> {
        let creation = self.creation.get()?;
        Some(RuntimeBound::new(
            creation.id,
            Arc::clone(&creation.registry),
            callback,
        ))
    }

    /// Drop cached handles of every destroyed runtime.
    ///
    /// Returns the number of runtime buckets dropped.
    pub fn purge_dead_runtimes(&self) -> usize {
        match self.creation.get() {
            Some(creation) => self.purge_dead_in(&creation.registry),
            None => 0,
        }
    }

    fn purge_dead_in(&self, registry: &RuntimeRegistry) -> usize {
        let purged = self.cache.retain_runtimes(|runtime| registry.is_alive(runtime));
        if purged > 0 {
            tracing::trace!(object = self.name(), purged, "dropped handles of destroyed runtimes");
        }
        purged
    }

    /// The object's function cache
    pub fn function_cache(&self) -> &FunctionCache {
        &self.cache
    }

    /// Native body of a materialized method: upgrades the receiver, checks
    /// the argument count and forwards.
    fn bind_method(&self, name: &str, arity: usize, method: MethodFn<T>) -> NativeFn {
        let this = self.this.clone();
        let owner = self.name().to_string();
        let function_name = name.to_string();
        Arc::new(move |rt: &dyn RuntimeContext, args: &[Value]| {
            let Some(object) = this.upgrade() else {
                return Err(HostError::Released {
                    name: owner.clone(),
                });
            };
            if args.len() < arity {
                return Err(HostError::ArgumentCount {
                    name: function_name.clone(),
                    expected: arity,
                    got: args.len(),
                });
            }
            guarded(&owner, &function_name, || method(&object.inner, rt, args))
        })
    }

    fn to_string_function(&self, rt: &dyn RuntimeContext) -> FunctionHandle {
        let this = self.this.clone();
        let name = self.name().to_string();
        let body: NativeFn = Arc::new(move |rt: &dyn RuntimeContext, _args: &[Value]| {
            let object = this.upgrade().ok_or_else(|| HostError::Released { name: name.clone() })?;
            Ok(Value::from(object.describe(rt)))
        });
        rt.create_function(TO_STRING, 0, body)
    }
}

impl<T: HybridObject> Deref for BridgedObject<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: HybridObject> HostObject for BridgedObject<T> {
    fn get(&self, rt: &dyn RuntimeContext, name: &str) -> HostResult<Value> {
        if !self.check_alive(rt, "get") {
            return Ok(Value::Undefined);
        }
        match self.get_member(rt, name)? {
            Some(value) => Ok(value),
            None => Ok(rt.default_get(name).unwrap_or_default()),
        }
    }

    fn set(&self, rt: &dyn RuntimeContext, name: &str, value: Value) -> HostResult<()> {
        if !self.check_alive(rt, "set") {
            return Ok(());
        }
        if self.set_member(rt, name, value.clone())? {
            return Ok(());
        }
        rt.default_set(name, value)
    }

    fn property_names(&self, rt: &dyn RuntimeContext) -> Vec<String> {
        self.member_names(rt)
    }

    fn display_name(&self) -> &str {
        self.name()
    }
}

impl<T: HybridObject> Drop for BridgedObject<T> {
    fn drop(&mut self) {
        tracing::trace!(object = self.inner.name(), instance = self.instance_id, "deleting bridged object");
    }
}

impl<T: HybridObject> std::fmt::Debug for BridgedObject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgedObject")
            .field("name", &self.name())
            .field("instance", &self.instance_id)
            .field("registered", &self.is_registered())
            .finish()
    }
}
