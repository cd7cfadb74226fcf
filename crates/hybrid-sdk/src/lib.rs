//! Hybrid SDK - Lightweight SDK for exposing native objects to scripts
//!
//! This crate provides the minimal types and traits shared by the bridge
//! engine, embedding runtimes and the wrapper classes built on top:
//!
//! - [`Value`] and [`FunctionHandle`]: what crosses the bridge
//! - [`RuntimeContext`]: the scripting runtime surface
//! - [`HostObject`]: the get/set/enumerate property protocol
//! - [`RuntimeRegistry`]: which runtimes may still be called into
//! - [`FromValue`]/[`ToValue`]: argument and return conversions
//!
//! # Example
//!
//! ```ignore
//! use hybrid_sdk::{arg, FunctionHandle, Value};
//!
//! let double = FunctionHandle::from_fn("double", 1, |_rt, args| {
//!     let x: f64 = arg(args, 0)?;
//!     Ok(Value::Number(x * 2.0))
//! });
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod context;
pub mod convert;
pub mod error;
pub mod function;
pub mod liveness;
pub mod object;
pub mod value;

pub use context::{RuntimeContext, RuntimeId};
pub use convert::{arg, FromValue, ToValue};
pub use error::{panic_message, HostError, HostResult};
pub use function::{FunctionHandle, NativeFn};
pub use liveness::{RuntimeBound, RuntimeLease, RuntimeRegistry};
pub use object::HostObject;
pub use value::Value;
