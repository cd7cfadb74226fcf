//! Host-object bridge
//!
//! Turns native types into property bags a scripting runtime can read,
//! write and enumerate.

pub mod cache;
pub mod members;
pub mod object;
pub mod pointer;

pub use cache::FunctionCache;
pub use members::{GetterFn, MemberDescriptor, MemberKind, MemberTable, MethodFn, SetterFn};
pub use object::{BridgedObject, HybridObject, TO_STRING};
pub use pointer::PointerHolder;
