//! Persistence layer: PostgreSQL storage for mosques and timetables.
//!
//! The concrete implementation uses `sqlx::PgPool` for async PostgreSQL
//! access and implements the repository ports from `domain::ports`.

pub mod models;
pub mod postgres;

use std::time::Duration;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::config::ServiceConfig;

pub use postgres::PostgresStore;

/// Embedded schema migrations from `migrations/`.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Opens the connection pool described by `config`.
///
/// # Errors
///
/// Returns the driver error when the database cannot be reached.
pub async fn connect(config: &ServiceConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await
}
