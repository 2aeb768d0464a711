// ============================================================================
// Storage Layer
// ============================================================================
//
// - schema/   - table bootstrap run once at startup
// - postgres/ - sqlx-backed OrderRepository (production)
// - memory/   - lock-protected OrderRepository (tests, local runs)
//
// ============================================================================

mod memory;
mod postgres;
pub mod schema;

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DatabaseConfig;
use crate::domain::order::OrderError;

pub use memory::InMemoryOrderRepository;
pub use postgres::PgOrderRepository;
pub use schema::ensure_schema;

/// Open the process-wide connection pool. Failure here is fatal for startup.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.url)
        .await
        .context("failed to connect to Postgres")?;

    tracing::info!(
        max_connections = config.max_connections,
        "Connected to Postgres"
    );

    Ok(pool)
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::storage(err)
    }
}
