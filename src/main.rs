use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use orders_service::api::{self, AppState};
use orders_service::config::Config;
use orders_service::db::{self, PgOrderRepository};
use orders_service::metrics::{self, Metrics};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,orders_service=debug"))
        )
        .init();

    tracing::info!("🚀 Starting orders service");

    // === 1. Configuration ===
    let config = Config::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    // === 2. Store: no listener is bound until the store is reachable ===
    tracing::info!("Connecting to Postgres...");
    let pool = db::connect(&config.database).await?;
    db::ensure_schema(&pool).await?;

    // === 3. Metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 4. HTTP servers ===
    let state = AppState::new(Arc::new(PgOrderRepository::new(pool)), metrics.clone())
        .with_max_body_bytes(config.max_body_bytes);

    tracing::info!("🌐 Serving orders API on http://{}", config.bind_addr);
    let api_server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(from_fn(api::request_telemetry))
            .configure(api::configure)
    })
    .bind(config.bind_addr)
    .with_context(|| format!("failed to bind {}", config.bind_addr))?
    .run();

    let metrics_server =
        metrics::start_metrics_server(Arc::new(metrics.registry().clone()), config.metrics_port);

    tokio::try_join!(api_server, metrics_server)?;

    tracing::info!("👋 Orders service stopped");
    Ok(())
}
