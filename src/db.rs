//! Database connection pool, units of work and migration management.
//!
//! This module provides utilities for:
//! - Creating and closing the PostgreSQL connection pool
//! - Opening a transactional unit of work per logical operation
//! - Running database migrations on request

use crate::config::Config;
use sqlx::{Pool, Postgres, Transaction};

/// Type alias for PostgreSQL connection pool.
pub type DbPool = Pool<Postgres>;

/// A single transactional database session bounding one logical operation.
///
/// Callers must `commit()` it explicitly. Dropping it without a commit (for
/// instance when `?` returns early) rolls the transaction back and returns the
/// connection to the pool.
pub type UnitOfWork = Transaction<'static, Postgres>;

/// Create a new PostgreSQL connection pool.
///
/// # Configuration
///
/// - Maximum connections: `DATABASE_MAX_CONNECTIONS`
/// - Acquire timeout: `DATABASE_ACQUIRE_TIMEOUT_SECS`, bounding how long a
///   request waits for a connection before failing with a backend error
///
/// # Errors
///
/// Returns an error if:
/// - Database connection string is invalid
/// - Cannot connect to PostgreSQL server
/// - Database authentication fails
pub async fn create_pool(config: &Config) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.database_url)
        .await
}

/// Create a pool that opens its first connection on first use.
///
/// Only the connection string is validated here. Used when the database is
/// unreachable at startup so the service can still come up and report itself
/// unhealthy until PostgreSQL returns.
pub fn create_lazy_pool(config: &Config) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_lazy(&config.database_url)
}

/// Begin a read-write unit of work.
pub async fn begin(pool: &DbPool) -> Result<UnitOfWork, sqlx::Error> {
    pool.begin().await
}

/// Begin a read-only unit of work pinned to one snapshot.
///
/// REPEATABLE READ makes every statement in the transaction see the same
/// snapshot, so counts taken by separate queries stay consistent with each
/// other while the ingestion side keeps inserting clicks.
pub async fn begin_read_only(pool: &DbPool) -> Result<UnitOfWork, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

/// Probe connectivity with a no-op query.
pub async fn ping(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Run database migrations from the `migrations/` directory.
///
/// The bundled migrations only create the tables this service reads when they
/// are missing, so running them against an existing store is harmless.
///
/// # Errors
///
/// Returns an error if:
/// - SQL syntax errors in migration files
/// - Database errors during migration execution
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
