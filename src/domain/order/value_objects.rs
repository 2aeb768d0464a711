use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

// ============================================================================
// Order Value Objects
// ============================================================================
//
// `Order` owns its `Item`s by value: the aggregate is always loaded and
// returned whole. The `order_id` linkage lives only in the storage layer and
// never appears in these types.
//
// ============================================================================

/// Surrogate key assigned by the store (`BIGSERIAL`)
pub type OrderId = i64;

/// Surrogate key of a line item
pub type ItemId = i64;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub ordered_at: DateTime<Utc>,
    pub items: Vec<Item>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub item_code: String,
    pub description: String,
    pub quantity: i32,
}

/// Creation payload. Ids sent by the client are ignored.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NewOrder {
    pub customer_name: String,
    pub ordered_at: Option<DateTime<Utc>>,
    pub items: Vec<NewItem>,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NewItem {
    pub item_code: String,
    pub description: String,
    pub quantity: i32,
}

/// Partial update of the order's own columns.
///
/// `None` means "leave untouched" (field absent or `null`); `Some("")` clears
/// the customer name. Nested items and ids in the payload are ignored.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderPatch {
    pub customer_name: Option<String>,
    pub ordered_at: Option<DateTime<Utc>>,
}

impl OrderPatch {
    pub fn is_empty(&self) -> bool {
        self.customer_name.is_none() && self.ordered_at.is_none()
    }

    /// Apply the present fields onto an already materialized order
    pub fn apply_to(&self, order: &mut Order) {
        if let Some(name) = &self.customer_name {
            order.customer_name = name.clone();
        }
        if let Some(ordered_at) = self.ordered_at {
            order.ordered_at = ordered_at;
        }
    }
}

/// Parse an id taken from a request path.
///
/// Only positive integers name an order; everything else matches nothing.
pub fn parse_order_id(raw: &str) -> Option<OrderId> {
    raw.trim().parse::<OrderId>().ok().filter(|id| *id > 0)
}

// ============================================================================
// Unit Tests
// ============================================================================
