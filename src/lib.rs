//! Multi-backend database connection pool registry.
//!
//! Descriptors in, pooled connections out: a pool is created lazily on
//! the first request for a database id, cached until explicitly removed,
//! and can be probed for liveness with its engine's probe query.

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::Config;
pub use db::{ConnectionProbe, EngineKind, EngineRegistry, PoolRegistry, ProbeReport, SqlxDriver};
pub use error::{DbError, DbResult, DriverError};
pub use models::DbDescriptor;
