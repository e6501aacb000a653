//! Connection liveness probing.
//!
//! A probe checks that a database actually answers: it takes one
//! connection from the registry, runs the engine's constant probe query
//! and reads back the first column of the first row. The connection is
//! scoped to the probe and returns to its pool on every exit path.

use crate::db::engine::EngineKind;
use crate::db::registry::PoolRegistry;
use crate::error::{DbError, DbResult};
use crate::models::DbDescriptor;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// Outcome of a successful probe.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub id: String,
    pub engine: EngineKind,
    /// The probe query that was executed.
    pub query: &'static str,
    /// First column of the first result row, if any.
    pub value: Option<String>,
    pub latency_ms: u64,
}

/// Probes database liveness through a registry's pools.
#[derive(Debug, Clone)]
pub struct ConnectionProbe {
    registry: PoolRegistry,
}

impl ConnectionProbe {
    pub fn new(registry: PoolRegistry) -> Self {
        Self { registry }
    }

    /// Run the engine's liveness query against the descriptor's database.
    ///
    /// An unsupported engine tag fails before any connection is taken.
    /// Acquisition and query failures are wrapped as probe errors; the
    /// pool itself stays registered either way.
    pub async fn probe(&self, descriptor: &DbDescriptor) -> DbResult<ProbeReport> {
        let profile = self.registry.engines().resolve(&descriptor.engine)?;
        let started = Instant::now();

        let mut conn = match self.registry.get_connection(descriptor).await {
            Ok(conn) => conn,
            Err(DbError::Acquisition { id, source }) => return Err(DbError::Probe { id, source }),
            Err(other) => return Err(other),
        };

        // `conn` drops on every path out of this scope, returning the
        // connection to its pool.
        let value = conn
            .query_scalar(profile.probe_query)
            .await
            .map_err(|e| DbError::probe(&descriptor.id, e))?;

        let latency_ms = started.elapsed().as_millis() as u64;
        match &value {
            Some(value) => info!(
                database_id = %descriptor.id,
                engine = %profile.kind,
                value = %value,
                latency_ms,
                "Probe succeeded"
            ),
            None => info!(
                database_id = %descriptor.id,
                engine = %profile.kind,
                latency_ms,
                "Probe succeeded with no rows"
            ),
        }

        Ok(ProbeReport {
            id: descriptor.id.clone(),
            engine: profile.kind,
            query: profile.probe_query,
            value,
            latency_ms,
        })
    }
}
