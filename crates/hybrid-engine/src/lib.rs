//! Hybrid Bridge Engine
//!
//! This crate exposes native objects to scripting runtimes:
//! - **Bridge**: lazy member registration, property dispatch and per-runtime
//!   function caching (`bridge` module)
//! - **Frame**: listener lists, the choreographer and frame clocks
//!   (`frame` module)
//! - **Dispatch**: running native teardown on the thread that owns it
//!   (`dispatch` module)
//!
//! Runtime liveness (`RuntimeRegistry`, `RuntimeLease`, `RuntimeBound`) and
//! the value types live in `hybrid-sdk` and are re-exported here.
//!
//! # Example
//!
//! ```rust,ignore
//! use hybrid_engine::{BridgedObject, HybridObject, MemberTable, Value};
//!
//! struct Foo {
//!     baz: f64,
//! }
//!
//! impl HybridObject for Foo {
//!     fn name(&self) -> &str {
//!         "Foo"
//!     }
//!
//!     fn register_members(&self, members: &mut MemberTable<Self>) {
//!         members
//!             .method("bar", 1, |_this, _rt, args| {
//!                 let x: f64 = hybrid_engine::arg(args, 0)?;
//!                 Ok(Value::Number(x * 2.0))
//!             })
//!             .getter("baz", |this, _rt| Ok(Value::Number(this.baz)));
//!     }
//! }
//!
//! let foo = BridgedObject::new(Foo { baz: 42.0 });
//! let value = foo.get(&*runtime, "baz")?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Bridge module: member tables, bridged objects, function cache
pub mod bridge;

/// Frame module: listener lists, choreographer, frame clocks
pub mod frame;

/// Dispatchers for thread-affine native work
pub mod dispatch;

/// Engine configuration
pub mod options;

/// Engine error types
pub mod error;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use hybrid_sdk as sdk;
pub use hybrid_sdk::{
    arg, FromValue, FunctionHandle, HostError, HostObject, HostResult, NativeFn, RuntimeBound,
    RuntimeContext, RuntimeId, RuntimeLease, RuntimeRegistry, ToValue, Value,
};

pub use bridge::{
    BridgedObject, FunctionCache, HybridObject, MemberDescriptor, MemberKind, MemberTable,
    PointerHolder,
};
pub use dispatch::{Dispatcher, Job, ThreadDispatcher};
pub use error::{EngineError, EngineResult};
pub use frame::{
    Choreographer, ChoreographerObject, FrameClock, FrameListenerObject, Listener, ListenerId,
    ListenerList, ThreadedFrameClock,
};
pub use options::EngineOptions;
