// Private module declaration
mod server;

use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - HTTP traffic (requests by route/status, latency)
// - Aggregate mutations (orders and items created, updated, deleted)
// - Storage failures by repository operation
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // HTTP Metrics
    pub http_requests_total: IntCounterVec,
    pub http_request_duration: HistogramVec,

    // Aggregate Metrics
    pub orders_created: IntCounter,
    pub order_items_created: IntCounter,
    pub orders_updated: IntCounter,
    pub orders_deleted: IntCounter,

    // Storage Metrics
    pub storage_failures: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // HTTP Metrics
        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests handled"),
            &["method", "route", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request handling duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["method", "route"],
        )?;
        registry.register(Box::new(http_request_duration.clone()))?;

        // Aggregate Metrics
        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let order_items_created = IntCounter::new(
            "order_items_created_total",
            "Total line items created together with their order",
        )?;
        registry.register(Box::new(order_items_created.clone()))?;

        let orders_updated = IntCounter::new("orders_updated_total", "Total orders updated")?;
        registry.register(Box::new(orders_updated.clone()))?;

        let orders_deleted = IntCounter::new(
            "orders_deleted_total",
            "Total orders actually removed (deletes of unknown ids are not counted)",
        )?;
        registry.register(Box::new(orders_deleted.clone()))?;

        // Storage Metrics
        let storage_failures = IntCounterVec::new(
            Opts::new("storage_failures_total", "Repository operations that failed in the store"),
            &["operation"],
        )?;
        registry.register(Box::new(storage_failures.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration,
            orders_created,
            order_items_created,
            orders_updated,
            orders_deleted,
            storage_failures,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record one handled HTTP request
    pub fn record_request(&self, method: &str, route: &str, status: u16, duration_secs: f64) {
        self.http_requests_total
            .with_label_values(&[method, route, &status.to_string()])
            .inc();
        self.http_request_duration
            .with_label_values(&[method, route])
            .observe(duration_secs);
    }

    /// Helper to record a created aggregate
    pub fn record_order_created(&self, item_count: usize) {
        self.orders_created.inc();
        self.order_items_created.inc_by(item_count as u64);
    }

    pub fn record_order_updated(&self) {
        self.orders_updated.inc();
    }

    /// Helper to record a delete; only counts when a row was removed
    pub fn record_order_deleted(&self, removed: bool) {
        if removed {
            self.orders_deleted.inc();
        }
    }

    pub fn record_storage_failure(&self, operation: &str) {
        self.storage_failures.with_label_values(&[operation]).inc();
    }
}
