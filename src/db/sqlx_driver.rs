//! Bundled sqlx-backed pool driver.
//!
//! Covers the engines sqlx ships drivers for: MySQL, PostgreSQL and
//! SQLite. Oracle and SQL Server have no bundled driver here; opening
//! them through this driver returns an error naming the gap.

use crate::db::driver::{DbConnection, DbPool, PoolDriver};
use crate::db::engine::{EngineKind, PoolConfig};
use crate::error::DriverError;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlRow};
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, MySqlPool, PgPool, Row, SqlitePool, TypeInfo, ValueRef};
use std::str::FromStr;
use std::sync::Arc;

/// Pool driver backed by sqlx.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxDriver;

impl SqlxDriver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PoolDriver for SqlxDriver {
    async fn open(
        &self,
        kind: EngineKind,
        config: &PoolConfig,
    ) -> Result<Arc<dyn DbPool>, DriverError> {
        match kind {
            EngineKind::MySQL => {
                let options = MySqlConnectOptions::from_str(&config.url)?.charset("utf8mb4");
                let pool = MySqlPoolOptions::new()
                    .min_connections(config.min_connections)
                    .max_connections(config.max_connections)
                    .acquire_timeout(config.acquire_timeout)
                    .idle_timeout(Some(config.idle_timeout))
                    .test_before_acquire(config.test_before_acquire)
                    .connect_with(options)
                    .await?;
                Ok(Arc::new(SqlxPool::MySql(pool)))
            }
            EngineKind::PostgreSQL => {
                let pool = PgPoolOptions::new()
                    .min_connections(config.min_connections)
                    .max_connections(config.max_connections)
                    .acquire_timeout(config.acquire_timeout)
                    .idle_timeout(Some(config.idle_timeout))
                    .test_before_acquire(config.test_before_acquire)
                    .connect(&config.url)
                    .await?;
                Ok(Arc::new(SqlxPool::Postgres(pool)))
            }
            EngineKind::SQLite => {
                let options =
                    SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
                let pool = SqlitePoolOptions::new()
                    .min_connections(config.min_connections)
                    .max_connections(config.max_connections)
                    .acquire_timeout(config.acquire_timeout)
                    .idle_timeout(Some(config.idle_timeout))
                    .test_before_acquire(config.test_before_acquire)
                    .connect_with(options)
                    .await?;
                Ok(Arc::new(SqlxPool::SQLite(pool)))
            }
            EngineKind::Oracle | EngineKind::SQLServer => Err(format!(
                "no bundled driver for {}; supply a custom PoolDriver",
                kind.display_name()
            )
            .into()),
        }
    }
}

/// Database-specific pool behind the driver seam.
enum SqlxPool {
    MySql(MySqlPool),
    Postgres(PgPool),
    SQLite(SqlitePool),
}

#[async_trait]
impl DbPool for SqlxPool {
    async fn acquire(&self) -> Result<Box<dyn DbConnection>, DriverError> {
        match self {
            SqlxPool::MySql(pool) => Ok(Box::new(SqlxConnection::MySql(pool.acquire().await?))),
            SqlxPool::Postgres(pool) => {
                Ok(Box::new(SqlxConnection::Postgres(pool.acquire().await?)))
            }
            SqlxPool::SQLite(pool) => Ok(Box::new(SqlxConnection::SQLite(pool.acquire().await?))),
        }
    }

    async fn close(&self) -> Result<(), DriverError> {
        match self {
            SqlxPool::MySql(pool) => pool.close().await,
            SqlxPool::Postgres(pool) => pool.close().await,
            SqlxPool::SQLite(pool) => pool.close().await,
        }
        Ok(())
    }
}

/// One checked-out sqlx connection.
enum SqlxConnection {
    MySql(PoolConnection<sqlx::MySql>),
    Postgres(PoolConnection<sqlx::Postgres>),
    SQLite(PoolConnection<sqlx::Sqlite>),
}

#[async_trait]
impl DbConnection for SqlxConnection {
    async fn query_scalar(&mut self, sql: &str) -> Result<Option<String>, DriverError> {
        match self {
            SqlxConnection::MySql(conn) => {
                match sqlx::query(sql).fetch_optional(&mut **conn).await? {
                    Some(row) => mysql_scalar(&row),
                    None => Ok(None),
                }
            }
            SqlxConnection::Postgres(conn) => {
                match sqlx::query(sql).fetch_optional(&mut **conn).await? {
                    Some(row) => pg_scalar(&row),
                    None => Ok(None),
                }
            }
            SqlxConnection::SQLite(conn) => {
                match sqlx::query(sql).fetch_optional(&mut **conn).await? {
                    Some(row) => sqlite_scalar(&row),
                    None => Ok(None),
                }
            }
        }
    }
}

/// Decode the first MySQL column to a display string.
/// A value that decodes through none of the branches is an error, not NULL.
fn mysql_scalar(row: &MySqlRow) -> Result<Option<String>, DriverError> {
    if row.columns().is_empty() {
        return Ok(None);
    }
    let type_name = row.columns()[0].type_info().name().to_ascii_lowercase();
    if type_name.contains("int") {
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(0) {
            return Ok(Some(v.to_string()));
        }
        if let Ok(Some(v)) = row.try_get::<Option<u64>, _>(0) {
            return Ok(Some(v.to_string()));
        }
    }
    if type_name == "boolean" || type_name == "bool" {
        if let Ok(Some(v)) = row.try_get::<Option<bool>, _>(0) {
            return Ok(Some(v.to_string()));
        }
    }
    if type_name.contains("float") || type_name.contains("double") {
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(0) {
            return Ok(Some(v.to_string()));
        }
    }
    Ok(row.try_get::<Option<String>, _>(0)?)
}

/// Decode the first PostgreSQL column to a display string.
/// A value that decodes through none of the branches is an error, not NULL.
fn pg_scalar(row: &PgRow) -> Result<Option<String>, DriverError> {
    if row.columns().is_empty() {
        return Ok(None);
    }
    let type_name = row.columns()[0].type_info().name().to_ascii_lowercase();
    if type_name.contains("int") {
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(0) {
            return Ok(Some(v.to_string()));
        }
        if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(0) {
            return Ok(Some(v.to_string()));
        }
        if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(0) {
            return Ok(Some(v.to_string()));
        }
    }
    if type_name == "bool" {
        if let Ok(Some(v)) = row.try_get::<Option<bool>, _>(0) {
            return Ok(Some(v.to_string()));
        }
    }
    if type_name.contains("float") || type_name == "numeric" {
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(0) {
            return Ok(Some(v.to_string()));
        }
    }
    Ok(row.try_get::<Option<String>, _>(0)?)
}

/// Decode the first SQLite column to a display string.
///
/// The declared column type is absent for expression columns (`SELECT 1`
/// reports no decltype), so classification uses the storage class of the
/// value actually held in the row. A non-NULL value that fails every
/// decode is an error, not NULL.
fn sqlite_scalar(row: &SqliteRow) -> Result<Option<String>, DriverError> {
    if row.columns().is_empty() {
        return Ok(None);
    }
    let raw = row.try_get_raw(0)?;
    if raw.is_null() {
        return Ok(None);
    }
    let type_name = raw.type_info().name().to_ascii_lowercase();
    if type_name.contains("int") {
        let v: i64 = row.try_get(0)?;
        return Ok(Some(v.to_string()));
    }
    if type_name == "real" {
        let v: f64 = row.try_get(0)?;
        return Ok(Some(v.to_string()));
    }
    let v: String = row.try_get(0)?;
    Ok(Some(v))
}
