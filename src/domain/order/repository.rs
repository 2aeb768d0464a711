use async_trait::async_trait;

use super::errors::OrderError;
use super::value_objects::{NewOrder, Order, OrderId, OrderPatch};

// ============================================================================
// Order Repository - persistence port for the Order/Item aggregate
// ============================================================================
//
// Every operation works on the whole aggregate. Implementations must make
// `create` and `delete` atomic: either all rows are written/removed or none.
//
// ============================================================================

#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    /// Persist an order and all of its items, returning ids assigned by the store
    async fn create(&self, order: NewOrder) -> Result<Order, OrderError>;

    /// All orders with their items, ordered by id ascending
    async fn list(&self) -> Result<Vec<Order>, OrderError>;

    async fn get(&self, id: OrderId) -> Result<Order, OrderError>;

    /// Whether an order row with `id` exists, without loading its items
    async fn exists(&self, id: OrderId) -> Result<bool, OrderError>;

    /// Overwrite the order's own columns present in `patch`. Items are untouched.
    async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<Order, OrderError>;

    /// Remove the order and its items. Returns whether an order row was removed.
    async fn delete(&self, id: OrderId) -> Result<bool, OrderError>;

    /// Cheap connectivity check used by the health endpoint
    async fn ping(&self) -> Result<(), OrderError>;
}
