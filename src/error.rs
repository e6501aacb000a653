//! Error types for the pool registry.
//!
//! All fallible registry operations return [`DbResult`]. Driver-level
//! failures are carried as boxed errors so external drivers can surface
//! whatever error type they produce without the registry naming it.

use thiserror::Error;

/// Error type produced by external pool drivers.
///
/// Drivers are free to return any error; the registry only needs to
/// display it and keep it in the source chain.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("unsupported database engine: {engine}")]
    UnsupportedEngine { engine: String },

    #[error("failed to create pool for database '{id}': {source}")]
    PoolCreation {
        id: String,
        #[source]
        source: DriverError,
    },

    #[error("failed to acquire connection from pool '{id}': {source}")]
    Acquisition {
        id: String,
        #[source]
        source: DriverError,
    },

    #[error("connection probe failed for database '{id}': {source}")]
    Probe {
        id: String,
        #[source]
        source: DriverError,
    },

    #[error("invalid database descriptor: {message}")]
    InvalidDescriptor { message: String },
}

impl DbError {
    /// Create an unsupported engine error.
    pub fn unsupported_engine(engine: impl Into<String>) -> Self {
        Self::UnsupportedEngine {
            engine: engine.into(),
        }
    }

    /// Create a pool creation error wrapping a driver failure.
    pub fn pool_creation(id: impl Into<String>, source: impl Into<DriverError>) -> Self {
        Self::PoolCreation {
            id: id.into(),
            source: source.into(),
        }
    }

    /// Create an acquisition error wrapping a driver failure.
    pub fn acquisition(id: impl Into<String>, source: impl Into<DriverError>) -> Self {
        Self::Acquisition {
            id: id.into(),
            source: source.into(),
        }
    }

    /// Create a probe error wrapping a driver failure.
    pub fn probe(id: impl Into<String>, source: impl Into<DriverError>) -> Self {
        Self::Probe {
            id: id.into(),
            source: source.into(),
        }
    }

    /// Create an invalid descriptor error.
    pub fn invalid_descriptor(message: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            message: message.into(),
        }
    }

    /// The database id this error relates to, if any.
    pub fn database_id(&self) -> Option<&str> {
        match self {
            Self::PoolCreation { id, .. } => Some(id),
            Self::Acquisition { id, .. } => Some(id),
            Self::Probe { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Check if this error is transient.
    ///
    /// Creation failures are never cached, so a later call retries from
    /// scratch; acquisition and probe failures are per-call conditions.
    /// Unsupported engines and malformed descriptors will fail the same
    /// way every time.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::PoolCreation { .. } | Self::Acquisition { .. } | Self::Probe { .. }
        )
    }
}

/// Result type alias for registry operations.
pub type DbResult<T> = Result<T, DbError>;
