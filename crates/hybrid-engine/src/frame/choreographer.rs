//! Per-frame broadcaster

use std::sync::atomic::{AtomicU64, Ordering};

use super::listeners::{Listener, ListenerList};

/// Broadcasts each frame timestamp (milliseconds) to its frame listeners.
///
/// The choreographer does not own a clock: a [`FrameClock`] or the
/// embedding's own vsync source calls [`Choreographer::on_frame`] once per
/// tick.
///
/// [`FrameClock`]: super::FrameClock
pub struct Choreographer {
    listeners: ListenerList<f64>,
    frames: AtomicU64,
}

impl Choreographer {
    /// Create a choreographer with no listeners
    pub fn new() -> Self {
        Self {
            listeners: ListenerList::new("choreographer"),
            frames: AtomicU64::new(0),
        }
    }

    /// Register a frame callback; it stays registered while the handle lives
    #[must_use = "dropping the handle removes the listener"]
    pub fn add_on_frame_listener<F>(&self, callback: F) -> Listener
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.listeners.add(move |timestamp: &f64| callback(*timestamp))
    }

    /// Deliver one tick. Returns the number of listeners invoked.
    pub fn on_frame(&self, timestamp: f64) -> usize {
        self.frames.fetch_add(1, Ordering::Relaxed);
        self.listeners.for_each(&timestamp)
    }

    /// Number of registered frame listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of ticks delivered so far
    pub fn frame_count(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Drop every frame listener
    pub fn clear(&self) {
        self.listeners.clear();
    }
}

impl Default for Choreographer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Choreographer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Choreographer")
            .field("listeners", &self.listener_count())
            .field("frames", &self.frame_count())
            .finish()
    }
}
