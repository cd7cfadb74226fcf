//! Multi-consumer listener lists
//!
//! A `ListenerList<A>` broadcasts `&A` to every registered callback. Adding
//! and removing listeners is allowed from any thread at any time, including
//! from inside a callback during a broadcast:
//!
//! - a broadcast snapshots the list when it starts; listeners added later
//!   are first invoked by the next broadcast
//! - a listener removed mid-broadcast is skipped if the broadcast has not
//!   reached it yet, and is never invoked again
//! - no lock is held while callbacks run
//!
//! A panicking callback is logged and skipped; the remaining listeners of
//! the same broadcast still run.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use hybrid_sdk::panic_message;
use parking_lot::RwLock;

/// Identifier of one registration within its list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

type Callback<A> = Arc<dyn Fn(&A) + Send + Sync>;

struct Entry<A> {
    id: ListenerId,
    registered: Arc<AtomicBool>,
    callback: Callback<A>,
}

/// Type-erased removal hook a [`Listener`] calls back into
trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: ListenerId) -> bool;
}

struct Shared<A> {
    label: String,
    entries: RwLock<Vec<Arc<Entry<A>>>>,
    next_id: AtomicU64,
}

impl<A> Unsubscribe for Shared<A> {
    fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write();
        let Some(index) = entries.iter().position(|entry| entry.id == id) else {
            return false;
        };
        let entry = entries.remove(index);
        entry.registered.store(false, Ordering::Release);
        tracing::trace!(list = %self.label, listener = %id, "listener removed");
        true
    }
}

/// Ordered, thread-safe list of callbacks taking `&A`.
pub struct ListenerList<A: 'static> {
    shared: Arc<Shared<A>>,
}

impl<A: 'static> ListenerList<A> {
    /// Create an empty list; `label` names it in logs
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(Shared {
                label: label.into(),
                entries: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register `callback`; it stays registered while the returned handle lives.
    #[must_use = "dropping the handle removes the listener"]
    pub fn add<F>(&self, callback: F) -> Listener
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        let id = ListenerId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let registered = Arc::new(AtomicBool::new(true));
        self.shared.entries.write().push(Arc::new(Entry {
            id,
            registered: registered.clone(),
            callback: Arc::new(callback),
        }));
        tracing::trace!(list = %self.shared.label, listener = %id, "listener added");

        let shared: Arc<dyn Unsubscribe> = self.shared.clone();
        Listener {
            id,
            registered,
            list: Some(Arc::downgrade(&shared)),
        }
    }

    /// Invoke every listener registered when the call starts, in
    /// registration order. Returns the number of listeners invoked.
    pub fn for_each(&self, arg: &A) -> usize {
        let snapshot: Vec<Arc<Entry<A>>> = self.shared.entries.read().clone();

        let mut invoked = 0;
        for entry in snapshot {
            if !entry.registered.load(Ordering::Acquire) {
                continue;
            }
            invoked += 1;
            let callback = &entry.callback;
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback(arg))) {
                tracing::error!(
                    list = %self.shared.label,
                    listener = %entry.id,
                    panic = %panic_message(payload.as_ref()),
                    "listener panicked"
                );
            }
        }
        invoked
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.shared.entries.read().len()
    }

    /// Check if no listener is registered
    pub fn is_empty(&self) -> bool {
        self.shared.entries.read().is_empty()
    }

    /// Unregister everything; outstanding handles report unregistered
    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.shared.entries.write());
        for entry in &removed {
            entry.registered.store(false, Ordering::Release);
        }
        tracing::trace!(list = %self.shared.label, removed = removed.len(), "listeners cleared");
    }

    /// Label used in logs
    pub fn label(&self) -> &str {
        &self.shared.label
    }
}

impl<A: 'static> std::fmt::Debug for ListenerList<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerList")
            .field("label", &self.shared.label)
            .field("len", &self.len())
            .finish()
    }
}

/// Handle to one registration.
///
/// Dropping it unregisters the callback. The handle does not keep the list
/// alive; once the list is gone the handle is inert.
pub struct Listener {
    id: ListenerId,
    registered: Arc<AtomicBool>,
    list: Option<Weak<dyn Unsubscribe>>,
}

impl Listener {
    /// This registration's identifier
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the callback is still registered; `false` once the list is
    /// gone
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
            && self.list.as_ref().is_some_and(|list| list.strong_count() > 0)
    }

    /// Unregister now; same as dropping the handle
    pub fn remove(mut self) {
        self.unregister();
    }

    /// Give up the handle but keep the callback registered for the rest of
    /// the list's lifetime.
    pub fn forget(mut self) {
        self.list = None;
    }

    fn unregister(&mut self) {
        if let Some(list) = self.list.take().and_then(|list| list.upgrade()) {
            list.unsubscribe(self.id);
        }
        self.registered.store(false, Ordering::Release);
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if self.list.is_some() {
            self.unregister();
        }
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("registered", &self.is_registered())
            .finish()
    }
}
