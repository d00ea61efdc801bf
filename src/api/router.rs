//! HTTP routing configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::Request,
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::app::AppState;
use crate::domain::StatusResponse;

use super::handlers::{
    cancel_appointment_handler, health_check_handler, list_clinics_handler,
    list_doctors_handler, list_specialties_handler, liveness_handler, metrics_handler,
    ping_handler, readiness_handler, register_appointment_handler,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Gives the bare 408 produced by `TimeoutLayer` the error envelope.
async fn timeout_envelope_middleware(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() == StatusCode::REQUEST_TIMEOUT
        && !response.headers().contains_key(header::CONTENT_TYPE)
    {
        return (
            StatusCode::REQUEST_TIMEOUT,
            Json(StatusResponse::error("Request timed out.")),
        )
            .into_response();
    }
    response
}

/// Builds the application router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(timeout_envelope_middleware))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ));

    // Catalogue routes
    let clinic_routes = Router::new()
        .route("/{clinica}", get(list_specialties_handler))
        .route("/{clinica}/{especialidade}", get(list_doctors_handler));

    // Booking routes
    let appointment_routes = Router::new()
        .route("/{clinica}/registar", post(register_appointment_handler))
        .route("/{clinica}/cancelar", post(cancel_appointment_handler));

    // Health routes
    let health_routes = Router::new()
        .route("/", get(health_check_handler))
        .route("/live", get(liveness_handler))
        .route("/ready", get(readiness_handler));

    Router::new()
        .route("/", get(list_clinics_handler))
        .route("/ping", get(ping_handler))
        .route("/metrics", get(metrics_handler))
        .nest("/c", clinic_routes)
        .nest("/a", appointment_routes)
        .nest("/health", health_routes)
        .layer(middleware)
        .with_state(app_state)
}
