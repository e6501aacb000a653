//! The external driver seam.
//!
//! The registry never talks wire protocols itself; it consumes pools
//! through these narrow object-safe traits. A bundled sqlx-backed driver
//! covers MySQL, PostgreSQL and SQLite; deployments needing Oracle or
//! SQL Server plug in their own [`PoolDriver`].

use crate::db::engine::{EngineKind, PoolConfig};
use crate::error::DriverError;
use async_trait::async_trait;
use std::sync::Arc;

/// One checked-out connection.
///
/// Dropping the box returns the connection to its pool, which is what
/// makes release unconditional on every exit path.
#[async_trait]
pub trait DbConnection: Send {
    /// Execute a query and return the first column of the first row as a
    /// display string. `None` when the query yields no rows or a NULL.
    async fn query_scalar(&mut self, sql: &str) -> Result<Option<String>, DriverError>;
}

/// One live connection pool.
#[async_trait]
pub trait DbPool: Send + Sync {
    /// Check out a connection from the pool.
    async fn acquire(&self) -> Result<Box<dyn DbConnection>, DriverError>;

    /// Close the pool and release its resources.
    async fn close(&self) -> Result<(), DriverError>;
}

/// Factory for engine-specific pools.
#[async_trait]
pub trait PoolDriver: Send + Sync {
    /// Open a pool for the given engine and configuration.
    async fn open(
        &self,
        kind: EngineKind,
        config: &PoolConfig,
    ) -> Result<Arc<dyn DbPool>, DriverError>;
}
