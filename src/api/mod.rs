// ============================================================================
// HTTP API
// ============================================================================
//
// - routes/   - route table and request telemetry middleware
// - handlers/ - request → repository → response translation
// - errors/   - OrderError → HTTP status and JSON body
// - state/    - shared application state injected into handlers
//
// ============================================================================

mod errors;
mod handlers;
mod routes;
mod state;

pub use errors::ErrorBody;
pub use routes::{configure, request_telemetry};
pub use state::AppState;
