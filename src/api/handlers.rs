use actix_web::{web, HttpResponse};
use serde::Serialize;

use super::errors::ErrorBody;
use super::state::AppState;
use crate::domain::order::{parse_order_id, NewOrder, Order, OrderError, OrderPatch};
use crate::health::{self, ComponentHealth};

// ============================================================================
// Order Handlers
// ============================================================================
//
// Bodies are read from the raw payload and decoded here so that decoding errors
// map to OrderError::MalformedRequest, oversized bodies to PayloadTooLarge, and,
// for updates, so the existence check can run before the body is looked at.
//
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    #[serde(rename = "success delete")]
    pub success_delete: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub components: Vec<ComponentHealth>,
}

/// Buffer the request body up to the configured limit
async fn read_body(payload: web::Payload, limit: usize) -> Result<web::Bytes, OrderError> {
    match payload.to_bytes_limited(limit).await {
        Ok(Ok(body)) => Ok(body),
        Ok(Err(_)) => Err(OrderError::PayloadTooLarge(limit)),
        Err(err) => Err(OrderError::malformed(err)),
    }
}

/// POST /orders
pub async fn create_order(
    state: web::Data<AppState>,
    payload: web::Payload,
) -> Result<HttpResponse, OrderError> {
    let body = read_body(payload, state.max_body_bytes).await?;
    let new_order: NewOrder = serde_json::from_slice(&body)?;

    let order = state.observe("create", state.repo.create(new_order).await)?;
    state.metrics.record_order_created(order.items.len());

    Ok(HttpResponse::Created().json(order))
}

/// GET /orders
pub async fn list_orders(state: web::Data<AppState>) -> Result<HttpResponse, OrderError> {
    let orders = state.observe("list", state.repo.list().await)?;
    Ok(HttpResponse::Ok().json(orders))
}

/// GET /orders/{id}
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, OrderError> {
    let id = parse_order_id(&path).ok_or(OrderError::NotFound)?;
    let order = state.observe("get", state.repo.get(id).await)?;
    Ok(HttpResponse::Ok().json(order))
}

/// PUT /orders/{id}
pub async fn update_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Payload,
) -> Result<HttpResponse, OrderError> {
    let id = parse_order_id(&path).ok_or(OrderError::NotFound)?;
    if !state.observe("exists", state.repo.exists(id).await)? {
        return Err(OrderError::NotFound);
    }

    let body = read_body(payload, state.max_body_bytes).await?;
    let patch: OrderPatch = serde_json::from_slice(&body)?;

    let order = state.observe("update", state.repo.update(id, patch).await)?;
    state.metrics.record_order_updated();

    Ok(HttpResponse::Ok().json(UpdateResponse {
        success: true,
        order,
    }))
}

/// DELETE /orders/{id}
///
/// Idempotent: unknown and unparsable ids succeed too.
pub async fn delete_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, OrderError> {
    let removed = match parse_order_id(&path) {
        Some(id) => state.observe("delete", state.repo.delete(id).await)?,
        None => false,
    };

    if !removed {
        tracing::debug!(id = %path.as_str(), "Delete matched no order");
    }
    state.metrics.record_order_deleted(removed);

    Ok(HttpResponse::Ok().json(DeleteResponse {
        success_delete: true,
    }))
}

/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = health::check_database(state.repo.as_ref()).await;
    let healthy = database.status.is_healthy();

    let body = HealthResponse {
        status: database.status.label(),
        service: "orders-service",
        components: vec![database],
    };

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// Fallback for unknown paths
pub async fn route_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody {
        error: "Route not found".to_string(),
    })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes;
    use crate::db::InMemoryOrderRepository;
    use crate::domain::order::OrderRepository;
    use crate::metrics::Metrics;
    use actix_web::http::StatusCode;
    use actix_web::middleware::from_fn;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn test_state() -> (AppState, Arc<InMemoryOrderRepository>) {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let state = AppState::new(repo.clone(), Arc::new(Metrics::new().unwrap()));
        (state, repo)
    }

    macro_rules! test_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .wrap(from_fn(routes::request_telemetry))
                    .configure(routes::configure),
            )
            .await
        };
    }

    fn alice() -> Value {
        json!({
            "customerName": "Alice",
            "orderedAt": "2024-01-01T00:00:00Z",
            "items": [{"itemCode": "SKU1", "description": "Widget", "quantity": 3}]
        })
    }

    #[actix_web::test]
    async fn test_order_lifecycle_scenario() {
        let (state, _) = test_state();
        let app = test_app!(state);

        // Create
        let req = test::TestRequest::post().uri("/orders").set_json(alice()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        let id = created["id"].as_i64().unwrap();
        assert!(id > 0);
        assert_eq!(created["items"].as_array().unwrap().len(), 1);
        assert!(created["items"][0]["id"].as_i64().unwrap() > 0);
        assert!(created["items"][0].get("orderId").is_none());

        // Update
        let req = test::TestRequest::put()
            .uri(&format!("/orders/{id}"))
            .set_json(json!({"customerName": "Alicia"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated: Value = test::read_body_json(resp).await;
        assert_eq!(updated["success"], true);
        assert_eq!(updated["order"]["id"], id);
        assert_eq!(updated["order"]["customerName"], "Alicia");
        assert_eq!(updated["order"]["orderedAt"], "2024-01-01T00:00:00Z");
        assert_eq!(updated["order"]["items"].as_array().unwrap().len(), 1);

        // Delete
        let req = test::TestRequest::delete().uri(&format!("/orders/{id}")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let deleted: Value = test::read_body_json(resp).await;
        assert_eq!(deleted, json!({"success delete": true}));

        // Gone
        let req = test::TestRequest::get().uri(&format!("/orders/{id}")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Order not found");
    }

    #[actix_web::test]
    async fn test_create_without_items_yields_empty_collection() {
        let (state, _) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({"customerName": ""}))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(created["customerName"], "");
        assert_eq!(created["items"], json!([]));
        assert!(created["orderedAt"].is_string());
    }

    #[actix_web::test]
    async fn test_create_with_malformed_body_is_bad_request() {
        let (state, repo) = test_state();
        let app = test_app!(state);

        for body in ["{not json", r#"{"customerName": 42}"#, r#"{"items": [{"quantity": "3"}]}"#] {
            let req = test::TestRequest::post()
                .uri("/orders")
                .insert_header(("content-type", "application/json"))
                .set_payload(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
            let error: Value = test::read_body_json(resp).await;
            assert!(!error["error"].as_str().unwrap().is_empty());
        }

        assert!(repo.list().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_create_accepts_order_with_thousands_of_items() {
        let (state, repo) = test_state();
        let app = test_app!(state);

        let items: Vec<Value> = (0..4000)
            .map(|n| {
                json!({
                    "itemCode": format!("SKU-{n:05}"),
                    "description": "Bulk widget with a reasonably long description",
                    "quantity": 1
                })
            })
            .collect();
        let body = json!({"customerName": "Bulk Buyer", "items": items});
        assert!(body.to_string().len() > 256 * 1024);

        let req = test::TestRequest::post().uri("/orders").set_json(body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["items"].as_array().unwrap().len(), 4000);

        let stored = repo.get(created["id"].as_i64().unwrap()).await.unwrap();
        assert_eq!(stored.items.len(), 4000);
    }

    #[actix_web::test]
    async fn test_body_over_limit_is_json_payload_too_large() {
        let (state, repo) = test_state();
        let state = state.with_max_body_bytes(1024);
        let app = test_app!(state);

        let long_name = "x".repeat(2048);
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({"customerName": long_name}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/json"
        );
        let error: Value = test::read_body_json(resp).await;
        assert_eq!(error["error"], "request body exceeds the 1024 byte limit");
        assert!(repo.list().await.unwrap().is_empty());

        let order = repo.create(serde_json::from_value(alice()).unwrap()).await.unwrap();
        let req = test::TestRequest::put()
            .uri(&format!("/orders/{}", order.id))
            .set_json(json!({"customerName": long_name}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(repo.get(order.id).await.unwrap().customer_name, "Alice");
    }

    #[actix_web::test]
    async fn test_list_returns_every_surviving_order() {
        let (state, _) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::get().uri("/orders").to_request();
        let orders: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(orders, json!([]));

        let mut ids = Vec::new();
        for _ in 0..3 {
            let req = test::TestRequest::post().uri("/orders").set_json(alice()).to_request();
            let created: Value = test::call_and_read_body_json(&app, req).await;
            ids.push(created["id"].as_i64().unwrap());
        }

        let req = test::TestRequest::delete().uri(&format!("/orders/{}", ids[1])).to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get().uri("/orders").to_request();
        let orders: Value = test::call_and_read_body_json(&app, req).await;
        let listed: Vec<i64> = orders
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["id"].as_i64().unwrap())
            .collect();
        assert_eq!(listed, vec![ids[0], ids[2]]);
        assert!(orders
            .as_array()
            .unwrap()
            .iter()
            .all(|o| o["items"].as_array().unwrap().len() == 1));
    }

    #[actix_web::test]
    async fn test_get_with_unparsable_id_is_not_found() {
        let (state, _) = test_state();
        let app = test_app!(state);

        for uri in ["/orders/abc", "/orders/0", "/orders/-1", "/orders/999"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "uri: {uri}");
        }
    }

    #[actix_web::test]
    async fn test_update_checks_existence_before_decoding() {
        let (state, _) = test_state();
        let app = test_app!(state.clone());

        let req = test::TestRequest::put()
            .uri("/orders/77")
            .insert_header(("content-type", "application/json"))
            .set_payload("{broken")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post().uri("/orders").set_json(alice()).to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::put()
            .uri(&format!("/orders/{}", created["id"]))
            .insert_header(("content-type", "application/json"))
            .set_payload("{broken")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        assert_eq!(
            state.metrics.storage_failures.with_label_values(&["exists"]).get(),
            0
        );
    }

    #[actix_web::test]
    async fn test_update_existence_check_failure_is_internal_error() {
        let (state, repo) = test_state();
        let app = test_app!(state.clone());
        repo.set_unavailable(true);

        let req = test::TestRequest::put()
            .uri("/orders/1")
            .insert_header(("content-type", "application/json"))
            .set_payload("{broken")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            state.metrics.storage_failures.with_label_values(&["exists"]).get(),
            1
        );
    }

    #[actix_web::test]
    async fn test_update_ignores_items_and_id_in_payload() {
        let (state, repo) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::post().uri("/orders").set_json(alice()).to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["id"].as_i64().unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/orders/{id}"))
            .set_json(json!({
                "id": id + 100,
                "orderedAt": "2025-06-01T12:00:00Z",
                "items": []
            }))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(updated["order"]["id"], id);
        assert_eq!(updated["order"]["customerName"], "Alice");
        assert_eq!(updated["order"]["orderedAt"], "2025-06-01T12:00:00Z");
        assert_eq!(updated["order"]["items"], created["items"]);

        let stored = repo.get(id).await.unwrap();
        assert_eq!(stored.items.len(), 1);
        assert!(repo.get(id + 100).await.is_err());
    }

    #[actix_web::test]
    async fn test_update_with_explicit_empty_name_clears_it() {
        let (state, _) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::post().uri("/orders").set_json(alice()).to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::put()
            .uri(&format!("/orders/{}", created["id"]))
            .set_json(json!({"customerName": ""}))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["order"]["customerName"], "");
    }

    #[actix_web::test]
    async fn test_delete_is_idempotent() {
        let (state, _) = test_state();
        let app = test_app!(state.clone());

        for uri in ["/orders/4242", "/orders/not-a-number"] {
            let req = test::TestRequest::delete().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body, json!({"success delete": true}));
        }

        assert_eq!(state.metrics.orders_deleted.get(), 0);
    }

    #[actix_web::test]
    async fn test_storage_failure_is_internal_error() {
        let (state, repo) = test_state();
        let app = test_app!(state.clone());
        repo.set_unavailable(true);

        let req = test::TestRequest::post().uri("/orders").set_json(alice()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let req = test::TestRequest::get().uri("/orders").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let req = test::TestRequest::delete().uri("/orders/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(state.metrics.storage_failures.with_label_values(&["create"]).get(), 1);
        assert_eq!(state.metrics.storage_failures.with_label_values(&["delete"]).get(), 1);
    }

    #[actix_web::test]
    async fn test_health_reflects_store_availability() {
        let (state, repo) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["components"][0]["name"], "database");

        repo.set_unavailable(true);
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn test_requests_are_counted_by_route_pattern() {
        let (state, _) = test_state();
        let app = test_app!(state.clone());

        for uri in ["/orders/1", "/orders/2"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            test::call_service(&app, req).await;
        }

        let count = state
            .metrics
            .http_requests_total
            .with_label_values(&["GET", "/orders/{id}", "404"])
            .get();
        assert_eq!(count, 2);
    }

    #[actix_web::test]
    async fn test_unknown_route_is_json_not_found() {
        let (state, _) = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::get().uri("/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
