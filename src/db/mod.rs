//! Database abstraction layer.
//!
//! This module provides the pool registry functionality:
//! - Engine profiles and the closed engine registry
//! - The driver seam (pool, connection and driver traits)
//! - Bundled sqlx-backed driver
//! - The pool registry
//! - Connection liveness probing

pub mod driver;
pub mod engine;
pub mod probe;
pub mod registry;
pub mod sqlx_driver;

pub use driver::{DbConnection, DbPool, PoolDriver};
pub use engine::{EngineKind, EngineProfile, EngineRegistry, PoolConfig};
pub use probe::{ConnectionProbe, ProbeReport};
pub use registry::PoolRegistry;
pub use sqlx_driver::SqlxDriver;
