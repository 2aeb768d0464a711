use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::order::OrderRepository;

// ============================================================================
// Health Check Abstractions
// ============================================================================
//
// The service has one dependency worth probing: the order store.
//
// ============================================================================

/// Health status of a component
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy(_) => "unhealthy",
        }
    }
}

/// Health information for a component
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Check the store behind the repository
pub async fn check_database(repo: &dyn OrderRepository) -> ComponentHealth {
    let started = std::time::Instant::now();

    match repo.ping().await {
        Ok(()) => ComponentHealth::new("database", HealthStatus::Healthy)
            .with_details(format!("ping {}ms", started.elapsed().as_millis())),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            ComponentHealth::new("database", HealthStatus::Unhealthy(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryOrderRepository;

    #[tokio::test]
    async fn test_reachable_store_is_healthy() {
        let repo = InMemoryOrderRepository::new();
        let health = check_database(&repo).await;

        assert_eq!(health.name, "database");
        assert!(health.status.is_healthy());
        assert!(health.details.is_some());
    }

    #[tokio::test]
    async fn test_unreachable_store_is_unhealthy() {
        let repo = InMemoryOrderRepository::new();
        repo.set_unavailable(true);

        let health = check_database(&repo).await;
        assert!(!health.status.is_healthy());
        assert_eq!(health.status.label(), "unhealthy");
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(HealthStatus::Unhealthy("down".into())).unwrap();
        assert_eq!(json["state"], "unhealthy");
        assert_eq!(json["reason"], "down");
    }
}
