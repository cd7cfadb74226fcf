//! Error types for the Hybrid SDK

/// Result type for calls that cross the bridge
pub type HostResult<T> = Result<T, HostError>;

/// Errors raised by bridged members and surfaced to the scripting runtime.
///
/// "Member not found" is deliberately absent: unknown property names fall
/// through to the runtime's default resolution instead of failing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HostError {
    /// Type mismatch during conversion
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// A function was called with fewer arguments than it declares
    #[error("{name}: expected {expected} argument(s), got {got}")]
    ArgumentCount {
        /// Function name
        name: String,
        /// Declared arity
        expected: usize,
        /// Number of arguments passed
        got: usize,
    },

    /// The native object (or the pointer it holds) is gone
    #[error("{name} has already been released")]
    Released {
        /// Display name of the released object
        name: String,
    },

    /// A callback reported a failure
    #[error("Callback failed: {0}")]
    Callback(String),

    /// A native function panicked
    #[error("Function panicked: {0}")]
    Panic(String),

    /// Generic runtime-level error
    #[error("{0}")]
    Runtime(String),
}

impl From<String> for HostError {
    fn from(s: String) -> Self {
        HostError::Runtime(s)
    }
}

impl From<&str> for HostError {
    fn from(s: &str) -> Self {
        HostError::Runtime(s.to_string())
    }
}

/// Extract a readable message from a caught panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
