use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::web;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use super::handlers;
use super::state::AppState;

/// Register every route of the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/orders")
            .route(web::post().to(handlers::create_order))
            .route(web::get().to(handlers::list_orders)),
    )
    .service(
        web::resource("/orders/{id}")
            .route(web::get().to(handlers::get_order))
            .route(web::put().to(handlers::update_order))
            .route(web::delete().to(handlers::delete_order)),
    )
    .route("/health", web::get().to(handlers::health_check))
    .default_service(web::to(handlers::route_not_found));
}

/// Per-request span, access log line and HTTP metrics.
///
/// Routes are labelled by pattern (`/orders/{id}`), never by concrete path.
pub async fn request_telemetry(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let started = Instant::now();
    let request_id = Uuid::new_v4();
    let method = req.method().to_string();
    let route = req.request().match_pattern().unwrap_or_else(|| "unmatched".to_string());
    let state = req.app_data::<web::Data<AppState>>().cloned();

    let span = tracing::info_span!("http_request", %request_id, %method, %route);
    let res = next.call(req).instrument(span.clone()).await?;

    let status = res.status().as_u16();
    let elapsed = started.elapsed();

    span.in_scope(|| {
        tracing::info!(status, elapsed_ms = elapsed.as_millis() as u64, "Request handled");
    });

    if let Some(state) = state {
        state
            .metrics
            .record_request(&method, &route, status, elapsed.as_secs_f64());
    }

    Ok(res)
}
