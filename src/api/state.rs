use std::sync::Arc;

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::domain::order::{OrderError, OrderRepository};
use crate::metrics::Metrics;

/// Shared by every worker: the repository (and through it the store pool) and metrics
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn OrderRepository>,
    pub metrics: Arc<Metrics>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(repo: Arc<dyn OrderRepository>, metrics: Arc<Metrics>) -> Self {
        Self {
            repo,
            metrics,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Count storage failures per repository operation, pass everything else through
    pub fn observe<T>(&self, operation: &str, result: Result<T, OrderError>) -> Result<T, OrderError> {
        if let Err(OrderError::StorageFailure(reason)) = &result {
            tracing::error!(operation, error = %reason, "Repository operation failed");
            self.metrics.record_storage_failure(operation);
        }
        result
    }
}
