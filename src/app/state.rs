//! Application state management.
//!
//! This module provides the shared application state that is
//! accessible to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::domain::DatabaseClient;
use crate::infra::PrometheusHandle;

use super::service::AppService;

/// Shared application state for the Axum web server.
///
/// The service owns the database client, which wraps the process-wide
/// connection pool; it is built once in `main` and handed to every
/// request through this struct.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
///
/// let db = Arc::new(PostgresClient::with_defaults(&database_url).await?);
/// let state = AppState::new(db);
///
/// let router = create_router(Arc::new(state));
/// ```
#[derive(Clone)]
pub struct AppState {
    /// The application service containing business logic.
    pub service: Arc<AppService>,

    /// Prometheus handle rendered by `GET /metrics`, when a recorder is installed.
    pub metrics: Option<Arc<PrometheusHandle>>,
}

impl AppState {
    /// Creates a new `AppState`, wiring an `AppService` to the client.
    #[must_use]
    pub fn new(db_client: Arc<dyn DatabaseClient>) -> Self {
        Self::with_service(Arc::new(AppService::new(db_client)))
    }

    /// Creates a new `AppState` with a custom service.
    ///
    /// This is useful for testing when you want to inject a pre-configured service,
    /// such as one reading a fixed clock.
    #[must_use]
    pub fn with_service(service: Arc<AppService>) -> Self {
        Self {
            service,
            metrics: None,
        }
    }

    /// Attaches the Prometheus handle.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Option<Arc<PrometheusHandle>>) -> Self {
        self.metrics = metrics;
        self
    }
}
