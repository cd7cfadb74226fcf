//! Engine error types

use hybrid_sdk::HostError;

/// Errors raised by the engine's own services (not by bridged members)
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Failed to read an options file
    #[error("Failed to read options file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML options
    #[error("Failed to parse options: {0}")]
    Parse(#[from] toml::de::Error),

    /// Options parsed but hold invalid values
    #[error("Invalid options: {0}")]
    Options(String),

    /// Dispatcher is shut down or its thread is gone
    #[error("Dispatcher error: {0}")]
    Dispatcher(String),

    /// Background thread could not be spawned
    #[error("Failed to spawn {name}: {source}")]
    Spawn {
        /// Thread name
        name: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Error raised by a bridged member
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Engine result type
pub type EngineResult<T> = Result<T, EngineError>;
