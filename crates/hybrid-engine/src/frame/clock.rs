//! Frame clocks that drive a [`Choreographer`]

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::choreographer::Choreographer;
use crate::error::{EngineError, EngineResult};
use crate::options::EngineOptions;

/// A tick source.
///
/// `start` and `stop` are idempotent: starting a running clock or stopping a
/// stopped one does nothing.
pub trait FrameClock: Send + Sync {
    /// Begin delivering ticks
    fn start(&self) -> EngineResult<()>;

    /// Stop delivering ticks; no tick starts after this returns
    fn stop(&self);

    /// Whether ticks are being delivered
    fn is_running(&self) -> bool;
}

/// Stop signal for one run of the clock thread
struct Signal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

struct Running {
    signal: Arc<Signal>,
    handle: JoinHandle<()>,
}

/// Ticks a [`Choreographer`] from a background thread at a fixed interval.
///
/// Each tick carries the milliseconds elapsed since `start`. A slow tick
/// delays the next one instead of queueing a burst.
pub struct ThreadedFrameClock {
    choreographer: Arc<Choreographer>,
    interval: Duration,
    thread_name: String,
    running: Mutex<Option<Running>>,
}

impl ThreadedFrameClock {
    /// Create a stopped clock for `choreographer`
    pub fn new(choreographer: Arc<Choreographer>, interval: Duration) -> Self {
        Self {
            choreographer,
            interval,
            thread_name: "hybrid-frame-clock".to_string(),
            running: Mutex::new(None),
        }
    }

    /// Create a stopped clock using the configured interval and thread name
    pub fn from_options(choreographer: Arc<Choreographer>, options: &EngineOptions) -> Self {
        let mut clock = Self::new(choreographer, options.frame_interval());
        clock.thread_name = options.frame_thread_name.clone();
        clock
    }

    /// Tick period
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The driven choreographer
    pub fn choreographer(&self) -> &Arc<Choreographer> {
        &self.choreographer
    }
}

fn run_clock(choreographer: &Choreographer, signal: &Signal, interval: Duration) {
    let started = Instant::now();
    let mut next_tick = started + interval;

    loop {
        {
            let mut stopped = signal.stopped.lock();
            while !*stopped && Instant::now() < next_tick {
                signal.wake.wait_until(&mut stopped, next_tick);
            }
            if *stopped {
                break;
            }
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        choreographer.on_frame(elapsed_ms);

        next_tick += interval;
        let now = Instant::now();
        if next_tick < now {
            next_tick = now + interval;
        }
    }
}

impl FrameClock for ThreadedFrameClock {
    fn start(&self) -> EngineResult<()> {
        let mut running = self.running.lock();
        if running.is_some() {
            return Ok(());
        }

        let signal = Arc::new(Signal {
            stopped: Mutex::new(false),
            wake: Condvar::new(),
        });
        let choreographer = self.choreographer.clone();
        let thread_signal = signal.clone();
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || run_clock(&choreographer, &thread_signal, interval))
            .map_err(|source| EngineError::Spawn {
                name: self.thread_name.clone(),
                source,
            })?;

        tracing::debug!(clock = %self.thread_name, interval_ms = interval.as_secs_f64() * 1000.0, "frame clock started");
        *running = Some(Running { signal, handle });
        Ok(())
    }

    fn stop(&self) {
        let Some(Running { signal, handle }) = self.running.lock().take() else {
            return;
        };

        *signal.stopped.lock() = true;
        signal.wake.notify_all();

        // A listener stopping the clock runs on the clock thread itself
        if handle.thread().id() != thread::current().id() && handle.join().is_err() {
            tracing::error!(clock = %self.thread_name, "frame clock thread panicked");
        }
        tracing::debug!(clock = %self.thread_name, "frame clock stopped");
    }

    fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }
}

impl Drop for ThreadedFrameClock {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ThreadedFrameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadedFrameClock")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel;

    #[test]
    fn test_clock_ticks_choreographer() {
        let choreographer = Arc::new(Choreographer::new());
        let clock = ThreadedFrameClock::new(choreographer.clone(), Duration::from_millis(2));
        let (tx, rx) = channel::unbounded();
        let _listener = choreographer.add_on_frame_listener(move |ts| {
            let _ = tx.send(ts);
        });

        clock.start().unwrap();
        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        clock.stop();

        assert!(first > 0.0);
        assert!(second >= first);
    }

    #[test]
    fn test_start_stop_idempotent() {
        let choreographer = Arc::new(Choreographer::new());
        let clock = ThreadedFrameClock::new(choreographer, Duration::from_millis(5));

        assert!(!clock.is_running());
        clock.start().unwrap();
        clock.start().unwrap();
        assert!(clock.is_running());

        clock.stop();
        clock.stop();
        assert!(!clock.is_running());

        clock.start().unwrap();
        assert!(clock.is_running());
    }

    #[test]
    fn test_no_ticks_after_stop() {
        let choreographer = Arc::new(Choreographer::new());
        let clock = ThreadedFrameClock::new(choreographer.clone(), Duration::from_millis(1));

        clock.start().unwrap();
        thread::sleep(Duration::from_millis(10));
        clock.stop();

        let frames = choreographer.frame_count();
        thread::sleep(Duration::from_millis(10));
        assert_eq!(choreographer.frame_count(), frames);
    }

    #[test]
    fn test_from_options() {
        let options = EngineOptions::default()
            .with_frame_interval(Duration::from_millis(8))
            .with_frame_thread_name("test-clock");
        let clock = ThreadedFrameClock::from_options(Arc::new(Choreographer::new()), &options);

        assert!((clock.interval().as_secs_f64() - 0.008).abs() < 1e-9);
        assert_eq!(clock.thread_name, "test-clock");
    }
}
