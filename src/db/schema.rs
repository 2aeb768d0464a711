use anyhow::{Context, Result};
use sqlx::PgPool;

// ============================================================================
// Schema bootstrap
// ============================================================================
//
// Tables are created at startup when absent. `items.order_id` references
// `orders.id` without ON DELETE CASCADE: the repository removes items itself,
// inside the same transaction as the order row.
//
// ============================================================================

pub const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id            BIGSERIAL PRIMARY KEY,
        customer_name TEXT NOT NULL DEFAULT '',
        ordered_at    TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id          BIGSERIAL PRIMARY KEY,
        code        TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        quantity    INTEGER NOT NULL DEFAULT 0,
        order_id    BIGINT NOT NULL REFERENCES orders (id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS items_order_id_idx ON items (order_id)",
];

/// Create the `orders` and `items` tables if they do not exist yet
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    let mut tx = pool.begin().await.context("begin schema transaction")?;

    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("schema statement failed: {}", statement.trim()))?;
    }

    tx.commit().await.context("commit schema transaction")?;

    tracing::info!(statements = SCHEMA_STATEMENTS.len(), "Schema ready");
    Ok(())
}
