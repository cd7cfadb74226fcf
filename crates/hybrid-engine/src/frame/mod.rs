//! Frame listeners
//!
//! A [`Choreographer`] broadcasts frame timestamps to listeners held in a
//! [`ListenerList`]; a [`FrameClock`] drives it.

pub mod choreographer;
pub mod clock;
pub mod listeners;
pub mod object;

pub use choreographer::Choreographer;
pub use clock::{FrameClock, ThreadedFrameClock};
pub use listeners::{Listener, ListenerId, ListenerList};
pub use object::{ChoreographerObject, FrameListenerObject};
