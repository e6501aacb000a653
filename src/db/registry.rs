//! The connection pool registry.
//!
//! Pools are created lazily, cached by database id, and served from the
//! cache until explicitly removed. Creation and removal for the same id
//! are serialized on one registry-wide lock, so at most one pool per id
//! is ever constructed under contention and a removal never races a
//! concurrent re-creation. A failed construction caches nothing; the
//! next request retries from scratch.

use crate::db::driver::{DbConnection, DbPool, PoolDriver};
use crate::db::engine::EngineRegistry;
use crate::error::{DbError, DbResult};
use crate::models::DbDescriptor;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Registry of live connection pools, keyed by database id.
///
/// Cheap to clone; clones share the same pool map.
#[derive(Clone)]
pub struct PoolRegistry {
    engines: EngineRegistry,
    driver: Arc<dyn PoolDriver>,
    pools: Arc<RwLock<HashMap<String, Arc<dyn DbPool>>>>,
    /// Serializes pool construction and removal. Never held for lookups
    /// on existing pools.
    create_lock: Arc<Mutex<()>>,
}

impl PoolRegistry {
    /// Create a registry backed by the given driver.
    pub fn new(driver: Arc<dyn PoolDriver>) -> Self {
        Self {
            engines: EngineRegistry::new(),
            driver,
            pools: Arc::new(RwLock::new(HashMap::new())),
            create_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The engine registry used to resolve descriptor tags.
    pub fn engines(&self) -> &EngineRegistry {
        &self.engines
    }

    /// Get the pool for a descriptor, creating it on first use.
    ///
    /// Concurrent first requests for the same id result in exactly one
    /// construction; the losers of the race get the winner's pool. A
    /// construction failure is returned to every caller that triggered
    /// it and nothing is cached.
    pub async fn get_pool(&self, descriptor: &DbDescriptor) -> DbResult<Arc<dyn DbPool>> {
        descriptor.validate()?;

        {
            let pools = self.pools.read().await;
            if let Some(pool) = pools.get(&descriptor.id) {
                debug!(database_id = %descriptor.id, "Pool cache hit");
                return Ok(Arc::clone(pool));
            }
        }

        let _create = self.create_lock.lock().await;

        // Re-check: another caller may have finished construction while
        // we waited for the lock.
        {
            let pools = self.pools.read().await;
            if let Some(pool) = pools.get(&descriptor.id) {
                debug!(database_id = %descriptor.id, "Pool created by concurrent caller");
                return Ok(Arc::clone(pool));
            }
        }

        let pool = self.build_pool(descriptor).await?;
        let mut pools = self.pools.write().await;
        pools.insert(descriptor.id.clone(), Arc::clone(&pool));
        Ok(pool)
    }

    /// Register a pool for a descriptor ahead of use.
    ///
    /// No-op if a pool for the id already exists; an existing pool is
    /// never replaced.
    pub async fn add_pool(&self, descriptor: &DbDescriptor) -> DbResult<()> {
        descriptor.validate()?;

        let _create = self.create_lock.lock().await;

        {
            let pools = self.pools.read().await;
            if pools.contains_key(&descriptor.id) {
                debug!(database_id = %descriptor.id, "Pool already registered");
                return Ok(());
            }
        }

        let pool = self.build_pool(descriptor).await?;
        let mut pools = self.pools.write().await;
        pools.insert(descriptor.id.clone(), pool);
        Ok(())
    }

    /// Remove and close the pool for an id.
    ///
    /// Close failures are logged, never returned; after this call the id
    /// is free for re-creation either way. Unknown ids are a no-op.
    pub async fn remove_pool(&self, id: &str) {
        let _create = self.create_lock.lock().await;

        let removed = {
            let mut pools = self.pools.write().await;
            pools.remove(id)
        }; // Map lock released; close happens under the create lock only

        match removed {
            Some(pool) => {
                if let Err(e) = pool.close().await {
                    warn!(database_id = %id, error = %e, "Failed to close pool");
                }
                info!(database_id = %id, "Pool removed");
            }
            None => {
                debug!(database_id = %id, "Remove requested for unknown pool");
            }
        }
    }

    /// Get one connection from the descriptor's pool, creating the pool
    /// on first use. Acquisition failures are surfaced per call and not
    /// retried here.
    pub async fn get_connection(
        &self,
        descriptor: &DbDescriptor,
    ) -> DbResult<Box<dyn DbConnection>> {
        let pool = self.get_pool(descriptor).await?;
        pool.acquire()
            .await
            .map_err(|e| DbError::acquisition(&descriptor.id, e))
    }

    /// Check if a pool exists for an id.
    pub async fn contains(&self, id: &str) -> bool {
        let pools = self.pools.read().await;
        pools.contains_key(id)
    }

    /// Number of live pools.
    pub async fn pool_count(&self) -> usize {
        let pools = self.pools.read().await;
        pools.len()
    }

    /// Ids of all live pools.
    pub async fn pool_ids(&self) -> Vec<String> {
        let pools = self.pools.read().await;
        pools.keys().cloned().collect()
    }

    /// Close every pool and clear the registry.
    pub async fn close_all(&self) {
        let _create = self.create_lock.lock().await;

        let drained: Vec<(String, Arc<dyn DbPool>)> = {
            let mut pools = self.pools.write().await;
            pools.drain().collect()
        };

        for (id, pool) in drained {
            info!(database_id = %id, "Closing pool");
            if let Err(e) = pool.close().await {
                warn!(database_id = %id, error = %e, "Failed to close pool");
            }
        }
        info!("All pools closed");
    }

    /// Resolve, configure and open a pool for a descriptor.
    ///
    /// Config-build and driver failures are both reported as pool
    /// creation errors carrying the id; only an unknown engine tag
    /// surfaces as itself.
    async fn build_pool(&self, descriptor: &DbDescriptor) -> DbResult<Arc<dyn DbPool>> {
        let profile = self.engines.resolve(&descriptor.engine)?;
        let config = profile
            .pool_config(descriptor)
            .map_err(|e| DbError::pool_creation(&descriptor.id, e))?;

        info!(
            database_id = %descriptor.id,
            name = %descriptor.display_name(),
            engine = %profile.kind,
            url = %config.masked_url(),
            max_connections = config.max_connections,
            "Creating connection pool"
        );

        self.driver
            .open(profile.kind, &config)
            .await
            .map_err(|e| DbError::pool_creation(&descriptor.id, e))
    }
}

impl std::fmt::Debug for PoolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolRegistry").finish_non_exhaustive()
    }
}
