use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app::AppState;
use crate::http::RouteModule;
use crate::records::Record;
use crate::repository::RecordRepository;

/// Health check status
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check result for a single component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Overall health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: Vec<ComponentHealth>,
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        let status_code = match self.status {
            HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status_code, Json(self)).into_response()
    }
}

/// Trait for implementing health checks
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &str;
    fn check(
        &self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ComponentHealth> + Send + '_>>;
}

/// Always healthy while the process is serving requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicHealthCheck;

impl HealthCheck for BasicHealthCheck {
    fn name(&self) -> &str {
        "application"
    }

    fn check(
        &self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ComponentHealth> + Send + '_>> {
        Box::pin(async {
            ComponentHealth {
                name: self.name().to_string(),
                status: HealthStatus::Healthy,
                message: Some("Application is running".to_string()),
            }
        })
    }
}

/// Lists a repository and reports its size.
///
/// An empty repository is degraded rather than unhealthy: the desk still
/// works but has nothing to show.
pub struct RepositoryHealthCheck<R: Record> {
    repository: Arc<dyn RecordRepository<R>>,
}

impl<R: Record> RepositoryHealthCheck<R> {
    pub fn new(repository: Arc<dyn RecordRepository<R>>) -> Self {
        Self { repository }
    }
}

impl<R: Record> HealthCheck for RepositoryHealthCheck<R> {
    fn name(&self) -> &str {
        R::ENTITY
    }

    fn check(
        &self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ComponentHealth> + Send + '_>> {
        Box::pin(async move {
            let (status, message) = match self.repository.list().await {
                Ok(rows) if rows.is_empty() => (HealthStatus::Degraded, "no records".to_string()),
                Ok(rows) => (HealthStatus::Healthy, format!("{} records", rows.len())),
                Err(err) => (HealthStatus::Unhealthy, err.to_string()),
            };
            ComponentHealth {
                name: self.name().to_string(),
                status,
                message: Some(message),
            }
        })
    }
}

/// Health check manager that runs all registered checks
pub struct HealthChecker {
    checks: Vec<Arc<dyn HealthCheck>>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            checks: vec![Arc::new(BasicHealthCheck)],
        }
    }

    /// Basic check plus one check per table repository.
    pub fn for_state(state: &AppState) -> Self {
        Self::new()
            .with_check(Arc::new(RepositoryHealthCheck::new(state.invoices.clone())))
            .with_check(Arc::new(RepositoryHealthCheck::new(state.payments.clone())))
            .with_check(Arc::new(RepositoryHealthCheck::new(state.subscribers.clone())))
            .with_check(Arc::new(RepositoryHealthCheck::new(state.tickets.clone())))
    }

    pub fn with_check(mut self, check: Arc<dyn HealthCheck>) -> Self {
        self.checks.push(check);
        self
    }

    pub async fn check_health(&self) -> HealthResponse {
        let mut checks = Vec::new();
        let mut overall_status = HealthStatus::Healthy;

        for check in &self.checks {
            let result = check.check().await;

            match result.status {
                HealthStatus::Unhealthy => overall_status = HealthStatus::Unhealthy,
                HealthStatus::Degraded if overall_status == HealthStatus::Healthy => {
                    overall_status = HealthStatus::Degraded
                }
                _ => {}
            }

            checks.push(result);
        }

        HealthResponse {
            status: overall_status,
            checks,
        }
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler for the health endpoint
pub async fn health_handler(State(state): State<AppState>) -> HealthResponse {
    HealthChecker::for_state(&state).check_health().await
}

/// `GET /health`
pub struct HealthModule;

impl RouteModule for HealthModule {
    fn routes(&self) -> Router<AppState> {
        Router::new().route("/health", get(health_handler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DeskError, Result};
    use crate::records::Invoice;
    use crate::repository::{InMemoryRepository, Mutation};
    use async_trait::async_trait;
    use uuid::Uuid;

    struct BrokenRepository;

    #[async_trait]
    impl RecordRepository<Invoice> for BrokenRepository {
        async fn list(&self) -> Result<Vec<Invoice>> {
            Err(DeskError::unavailable("store offline"))
        }

        async fn get(&self, _id: Uuid) -> Result<Option<Invoice>> {
            Err(DeskError::unavailable("store offline"))
        }

        async fn insert(&self, _record: Invoice) -> Result<()> {
            Err(DeskError::unavailable("store offline"))
        }

        async fn update(&self, _record: Invoice) -> Result<()> {
            Err(DeskError::unavailable("store offline"))
        }

        async fn delete(&self, _id: Uuid) -> Result<bool> {
            Err(DeskError::unavailable("store offline"))
        }

        async fn modify<'a>(&self, _id: Uuid, _mutation: Mutation<'a, Invoice>) -> Result<Invoice> {
            Err(DeskError::unavailable("store offline"))
        }
    }

    #[tokio::test]
    async fn test_empty_repository_is_degraded() {
        let checker = HealthChecker::new().with_check(Arc::new(
            RepositoryHealthCheck::<Invoice>::new(Arc::new(InMemoryRepository::new())),
        ));
        let response = checker.check_health().await;
        assert_eq!(response.status, HealthStatus::Degraded);
        assert_eq!(response.checks[1].name, "invoices");
    }

    #[tokio::test]
    async fn test_failing_repository_is_unhealthy() {
        let checker = HealthChecker::new()
            .with_check(Arc::new(RepositoryHealthCheck::<Invoice>::new(Arc::new(
                BrokenRepository,
            ))));
        let response = checker.check_health().await;
        assert_eq!(response.status, HealthStatus::Unhealthy);
        assert_eq!(
            response.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
