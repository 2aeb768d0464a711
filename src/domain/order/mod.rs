// ============================================================================
// Order Domain - the Order/Item aggregate
// ============================================================================
//
// - Value objects (Order, Item, creation and patch payloads)
// - Errors (OrderError)
// - Repository port (OrderRepository)
//
// Storage implementations live in `crate::db`.
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod repository;

pub use value_objects::*;
pub use errors::*;
pub use repository::*;
