//! Database descriptor model.
//!
//! A descriptor identifies one logical database and carries everything the
//! engine profile needs to build a pool configuration for it.

use crate::config::PoolSettings;
use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Description of one logical database.
///
/// The `id` is the registry key: it uniquely determines at most one live
/// pool at any time. The `engine` tag is stored as received and resolved
/// against the engine registry when the descriptor is used, not here.
/// Everything else is passthrough data for the engine profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbDescriptor {
    pub id: String,
    /// Engine tag, e.g. "mysql", "postgres", "oracle".
    pub engine: String,
    /// Human-readable name for log output. Defaults to the id.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub host: String,
    /// Engine default applied when absent.
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: String,
    /// Contains sensitive data - never log
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    /// Database or schema name; file path for SQLite.
    #[serde(default)]
    pub database: String,
    /// Extra engine-specific options appended to the connection URL query.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Pool sizing knobs, passed through to the driver.
    #[serde(default)]
    pub pool: PoolSettings,
}

impl DbDescriptor {
    /// Create a descriptor with the given id and engine tag.
    /// Remaining fields start empty and can be filled in directly.
    pub fn new(id: impl Into<String>, engine: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            engine: engine.into(),
            host: String::new(),
            port: None,
            user: String::new(),
            password: None,
            database: String::new(),
            params: BTreeMap::new(),
            pool: PoolSettings::default(),
        }
    }

    /// Check the fields the registry itself depends on.
    pub fn validate(&self) -> DbResult<()> {
        if self.id.trim().is_empty() {
            return Err(DbError::invalid_descriptor("database id cannot be empty"));
        }
        if self.engine.trim().is_empty() {
            return Err(DbError::invalid_descriptor(
                "database engine cannot be empty",
            ));
        }
        Ok(())
    }

    /// Name to use in log output and reports.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}
