use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;

use crate::domain::order::{
    Item, NewOrder, Order, OrderError, OrderId, OrderPatch, OrderRepository,
};

// ============================================================================
// PostgreSQL Order Repository
// ============================================================================
//
// Multi-statement operations run inside one `sqlx::Transaction`. An early
// return drops the transaction, which rolls it back, so a failure partway
// through create or delete never leaves partial rows behind.
//
// Reads that touch both tables use a REPEATABLE READ snapshot so the items
// returned always belong to the orders returned.
//
// ============================================================================

const SNAPSHOT_READ: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY";

#[derive(Debug, FromRow)]
struct OrderRow {
    id: i64,
    customer_name: String,
    ordered_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<Item>) -> Order {
        Order {
            id: self.id,
            customer_name: self.customer_name,
            ordered_at: self.ordered_at,
            items,
        }
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: i64,
    code: String,
    description: String,
    quantity: i32,
    order_id: i64,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            item_code: row.code,
            description: row.description,
            quantity: row.quantity,
        }
    }
}

#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(conn: &mut PgConnection, order_id: OrderId) -> Result<Vec<Item>, sqlx::Error> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT id, code, description, quantity, order_id
             FROM items
             WHERE order_id = $1
             ORDER BY id ASC",
        )
        .bind(order_id)
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().map(Item::from).collect())
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, new_order: NewOrder) -> Result<Order, OrderError> {
        let ordered_at = new_order.ordered_at.unwrap_or_else(Utc::now);

        let mut tx = self.pool.begin().await?;

        let row: OrderRow = sqlx::query_as(
            "INSERT INTO orders (customer_name, ordered_at)
             VALUES ($1, $2)
             RETURNING id, customer_name, ordered_at",
        )
        .bind(&new_order.customer_name)
        .bind(ordered_at)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(new_order.items.len());
        for item in &new_order.items {
            let item_row: ItemRow = sqlx::query_as(
                "INSERT INTO items (code, description, quantity, order_id)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id, code, description, quantity, order_id",
            )
            .bind(&item.item_code)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(row.id)
            .fetch_one(&mut *tx)
            .await?;

            items.push(Item::from(item_row));
        }

        tx.commit().await?;

        tracing::info!(
            order_id = row.id,
            item_count = items.len(),
            "✅ Order created"
        );

        Ok(row.into_order(items))
    }

    async fn list(&self) -> Result<Vec<Order>, OrderError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(SNAPSHOT_READ).execute(&mut *tx).await?;

        let rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT id, customer_name, ordered_at FROM orders ORDER BY id ASC",
        )
        .fetch_all(&mut *tx)
        .await?;

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let item_rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT id, code, description, quantity, order_id
             FROM items
             WHERE order_id = ANY($1)
             ORDER BY id ASC",
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut items_by_order: HashMap<i64, Vec<Item>> = HashMap::new();
        for item_row in item_rows {
            items_by_order
                .entry(item_row.order_id)
                .or_default()
                .push(Item::from(item_row));
        }

        let orders: Vec<Order> = rows
            .into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect();

        tracing::debug!(order_count = orders.len(), "Listed orders");
        Ok(orders)
    }

    async fn get(&self, id: OrderId) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(SNAPSHOT_READ).execute(&mut *tx).await?;

        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT id, customer_name, ordered_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(OrderError::NotFound);
        };

        let items = Self::load_items(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(row.into_order(items))
    }

    async fn exists(&self, id: OrderId) -> Result<bool, OrderError> {
        let found: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }

    async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<Order, OrderError> {
        // Nothing to write
        if patch.is_empty() {
            return self.get(id).await;
        }

        let mut tx = self.pool.begin().await?;

        // COALESCE keeps the stored value for every field the patch leaves out
        let row: Option<OrderRow> = sqlx::query_as(
            "UPDATE orders
             SET customer_name = COALESCE($2, customer_name),
                 ordered_at    = COALESCE($3, ordered_at)
             WHERE id = $1
             RETURNING id, customer_name, ordered_at",
        )
        .bind(id)
        .bind(patch.customer_name.as_deref())
        .bind(patch.ordered_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(OrderError::NotFound);
        };

        let items = Self::load_items(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(
            order_id = id,
            customer_name_changed = patch.customer_name.is_some(),
            ordered_at_changed = patch.ordered_at.is_some(),
            "✅ Order updated"
        );

        Ok(row.into_order(items))
    }

    async fn delete(&self, id: OrderId) -> Result<bool, OrderError> {
        let mut tx = self.pool.begin().await?;

        let items_removed = sqlx::query("DELETE FROM items WHERE order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let orders_removed = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        tracing::info!(
            order_id = id,
            items_removed,
            orders_removed,
            "✅ Order deleted"
        );

        Ok(orders_removed > 0)
    }

    async fn ping(&self) -> Result<(), OrderError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
