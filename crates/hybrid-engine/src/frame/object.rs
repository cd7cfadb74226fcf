//! Script-facing frame callback objects
//!
//! `ChoreographerObject` lets script register `(timestamp) => void`
//! callbacks. Frame ticks arrive on the clock thread, long after the
//! registering call returned, so every callback is bound to its runtime and
//! skipped once that runtime is destroyed.

use std::sync::{Arc, Weak};

use hybrid_sdk::{
    arg, FunctionHandle, HostError, HostObject, RuntimeBound, RuntimeContext, Value,
};
use parking_lot::Mutex;

use super::choreographer::Choreographer;
use super::listeners::Listener;
use crate::bridge::{BridgedObject, HybridObject, MemberTable};

/// Script callback plus the runtime it must run in
type ScriptCallback = (Weak<dyn RuntimeContext>, FunctionHandle);

/// Bridges a [`Choreographer`] to script
pub struct ChoreographerObject {
    choreographer: Arc<Choreographer>,
}

impl ChoreographerObject {
    /// Wrap `choreographer` for bridging
    pub fn new(choreographer: Arc<Choreographer>) -> Arc<BridgedObject<Self>> {
        BridgedObject::new(Self { choreographer })
    }

    /// The wrapped choreographer
    pub fn choreographer(&self) -> &Arc<Choreographer> {
        &self.choreographer
    }

    /// Register `callback` to run in `rt` on every frame while `rt` lives.
    pub fn add_frame_callback(
        &self,
        rt: &dyn RuntimeContext,
        callback: FunctionHandle,
    ) -> Result<Listener, HostError> {
        let shared = rt.to_shared().ok_or_else(|| {
            HostError::Callback(format!(
                "{} cannot hold frame callbacks for {}",
                rt.id(),
                callback.name()
            ))
        })?;
        let target: ScriptCallback = (Arc::downgrade(&shared), callback);
        let bound = RuntimeBound::new(rt.id(), Arc::clone(rt.registry()), target);

        Ok(self.choreographer.add_on_frame_listener(move |timestamp| {
            bound.invoke(|(runtime, callback)| {
                let Some(runtime) = runtime.upgrade() else {
                    return;
                };
                if let Err(err) = callback.call(&*runtime, &[Value::Number(timestamp)]) {
                    tracing::warn!(
                        runtime = %runtime.id(),
                        callback = callback.name(),
                        error = %err,
                        "frame callback failed"
                    );
                }
            });
        }))
    }
}

impl HybridObject for ChoreographerObject {
    fn name(&self) -> &str {
        "Choreographer"
    }

    fn register_members(&self, members: &mut MemberTable<Self>) {
        members
            .method("addFrameCallback", 1, |this, rt, args| {
                let callback: FunctionHandle = arg(args, 0)?;
                let listener = this.add_frame_callback(rt, callback)?;
                let handle: Arc<dyn HostObject> = FrameListenerObject::new(listener);
                Ok(Value::Object(handle))
            })
            .getter("listenerCount", |this, _rt| {
                Ok(Value::Number(this.choreographer.listener_count() as f64))
            });
    }
}

/// Script handle for one frame callback.
///
/// The callback stays registered until `remove()` is called or the handle
/// is collected.
pub struct FrameListenerObject {
    listener: Mutex<Option<Listener>>,
}

impl FrameListenerObject {
    /// Wrap `listener` for bridging
    pub fn new(listener: Listener) -> Arc<BridgedObject<Self>> {
        BridgedObject::new(Self {
            listener: Mutex::new(Some(listener)),
        })
    }

    /// Unregister the callback. Returns `false` if it was already removed.
    pub fn remove(&self) -> bool {
        let listener = self.listener.lock().take();
        match listener {
            Some(listener) => {
                listener.remove();
                true
            }
            None => false,
        }
    }

    /// Whether the callback is still registered
    pub fn is_valid(&self) -> bool {
        self.listener
            .lock()
            .as_ref()
            .is_some_and(Listener::is_registered)
    }
}

impl HybridObject for FrameListenerObject {
    fn name(&self) -> &str {
        "FrameListener"
    }

    fn register_members(&self, members: &mut MemberTable<Self>) {
        members
            .method("remove", 0, |this, _rt, _args| {
                this.remove();
                Ok(Value::Undefined)
            })
            .getter("isValid", |this, _rt| Ok(Value::Bool(this.is_valid())));
    }
}
