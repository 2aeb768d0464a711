// ============================================================================
// Domain Layer
// ============================================================================
//
// Types and ports for the Order/Item aggregate. Nothing in here knows about
// HTTP or SQL.
//
// ============================================================================

pub mod order;
