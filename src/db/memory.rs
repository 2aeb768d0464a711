use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::domain::order::{
    Item, NewOrder, Order, OrderError, OrderId, OrderPatch, OrderRepository,
};

// ============================================================================
// In-memory Order Repository
// ============================================================================
//
// Same contract as the PostgreSQL repository, backed by a map behind a single
// lock. Every operation holds the lock for its whole duration, which makes
// create and delete atomic. Ids come from monotonically increasing counters
// and are never reused.
//
// ============================================================================

#[derive(Default)]
struct MemoryState {
    last_order_id: OrderId,
    last_item_id: i64,
    orders: BTreeMap<OrderId, Order>,
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    state: Mutex<MemoryState>,
    unavailable: AtomicBool,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StorageFailure` (or recover)
    #[cfg(test)]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), OrderError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(OrderError::storage("in-memory store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, new_order: NewOrder) -> Result<Order, OrderError> {
        self.check_available()?;
        let mut state = self.state.lock().await;

        state.last_order_id += 1;
        let id = state.last_order_id;

        let mut items = Vec::with_capacity(new_order.items.len());
        for item in new_order.items {
            state.last_item_id += 1;
            items.push(Item {
                id: state.last_item_id,
                item_code: item.item_code,
                description: item.description,
                quantity: item.quantity,
            });
        }

        let order = Order {
            id,
            customer_name: new_order.customer_name,
            ordered_at: new_order.ordered_at.unwrap_or_else(Utc::now),
            items,
        };
        state.orders.insert(id, order.clone());

        tracing::debug!(order_id = id, item_count = order.items.len(), "Order created in memory");
        Ok(order)
    }

    async fn list(&self) -> Result<Vec<Order>, OrderError> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state.orders.values().cloned().collect())
    }

    async fn get(&self, id: OrderId) -> Result<Order, OrderError> {
        self.check_available()?;
        let state = self.state.lock().await;
        state.orders.get(&id).cloned().ok_or(OrderError::NotFound)
    }

    async fn exists(&self, id: OrderId) -> Result<bool, OrderError> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state.orders.contains_key(&id))
    }

    async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<Order, OrderError> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let order = state.orders.get_mut(&id).ok_or(OrderError::NotFound)?;
        patch.apply_to(order);
        Ok(order.clone())
    }

    async fn delete(&self, id: OrderId) -> Result<bool, OrderError> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        Ok(state.orders.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), OrderError> {
        self.check_available()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
