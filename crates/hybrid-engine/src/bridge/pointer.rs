//! Pointer holders: bridged owners of a shared native value
//!
//! Script cannot free native memory deterministically, so wrappers that own
//! something heavy expose `release()` to drop it early. After release every
//! access reports [`HostError::Released`] instead of touching freed state.

use std::sync::Arc;

use hybrid_sdk::{HostError, HostResult, Value};
use parking_lot::Mutex;

use super::members::MemberTable;
use super::object::HybridObject;
use crate::dispatch::Dispatcher;

/// Holds one strong reference to a native value until released.
///
/// Releasing drops only the holder's reference; other owners keep the value
/// alive. With a dispatcher attached, the reference is dropped on the
/// dispatcher's thread.
pub struct PointerHolder<T: Send + Sync + 'static> {
    name: String,
    pointer: Mutex<Option<Arc<T>>>,
    dispatcher: Option<Arc<dyn Dispatcher>>,
}

impl<T: Send + Sync + 'static> PointerHolder<T> {
    /// Hold `pointer`; it is dropped on whichever thread releases it
    pub fn new(name: impl Into<String>, pointer: Arc<T>) -> Self {
        Self {
            name: name.into(),
            pointer: Mutex::new(Some(pointer)),
            dispatcher: None,
        }
    }

    /// Hold `pointer`; it is dropped on `dispatcher`'s thread
    pub fn with_dispatcher(
        name: impl Into<String>,
        pointer: Arc<T>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            name: name.into(),
            pointer: Mutex::new(Some(pointer)),
            dispatcher: Some(dispatcher),
        }
    }

    /// The held value, or `HostError::Released` after release
    pub fn pointee(&self) -> HostResult<Arc<T>> {
        self.pointer
            .lock()
            .clone()
            .ok_or_else(|| HostError::Released {
                name: self.name.clone(),
            })
    }

    /// Whether the value is still held
    pub fn is_valid(&self) -> bool {
        self.pointer.lock().is_some()
    }

    /// Drop the held reference. Returns `false` if already released.
    pub fn release(&self) -> bool {
        let pointer = self.pointer.lock().take();
        match pointer {
            Some(pointer) => {
                tracing::trace!(holder = %self.name, "releasing pointer");
                self.drop_pointer(pointer);
                true
            }
            None => false,
        }
    }

    fn drop_pointer(&self, pointer: Arc<T>) {
        let Some(dispatcher) = &self.dispatcher else {
            return;
        };
        if dispatcher.is_dispatcher_thread() {
            return;
        }
        // Hand the reference over; if the dispatcher is gone the job (and
        // with it the reference) is dropped right here
        if let Err(err) = dispatcher.run_async(Box::new(move || drop(pointer))) {
            tracing::warn!(holder = %self.name, error = %err, "dropping pointer on the releasing thread");
        }
    }

    /// Expose `release()` and `isValid` on a wrapper that embeds a holder
    pub fn register_into<W: 'static>(members: &mut MemberTable<W>, project: fn(&W) -> &Self) {
        let mut own = MemberTable::new(members_owner::<T>());
        register_holder_members(&mut own);
        own.project_into(members, project);
    }
}

fn members_owner<T>() -> String {
    format!("PointerHolder<{}>", std::any::type_name::<T>())
}

fn register_holder_members<T: Send + Sync + 'static>(members: &mut MemberTable<PointerHolder<T>>) {
    members
        .method("release", 0, |this, _rt, _args| {
            this.release();
            Ok(Value::Undefined)
        })
        .getter("isValid", |this, _rt| Ok(Value::Bool(this.is_valid())));
}

impl<T: Send + Sync + 'static> HybridObject for PointerHolder<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn register_members(&self, members: &mut MemberTable<Self>) {
        register_holder_members(members);
    }
}

impl<T: Send + Sync + 'static> Drop for PointerHolder<T> {
    fn drop(&mut self) {
        self.release();
    }
}
