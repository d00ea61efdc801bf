//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::error;

use super::extract::{ApiPath, BookingQuery};

use crate::app::AppState;
use crate::domain::{
    AppError, Clinic, DatabaseError, DoctorSchedule, HealthResponse, HealthStatus, StatusResponse,
};

/// `GET /`: every clinic with its address.
pub async fn list_clinics_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Clinic>>, AppError> {
    let clinics = state.service.list_clinics().await?;
    Ok(Json(clinics))
}

/// `GET /c/{clinica}`: specialties practised at a clinic.
pub async fn list_specialties_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(clinica): ApiPath<String>,
) -> Result<Json<Vec<String>>, AppError> {
    let specialties = state.service.list_specialties(&clinica).await?;
    Ok(Json(specialties))
}

/// `GET /c/{clinica}/{especialidade}`: doctors with their next open slots.
pub async fn list_doctors_handler(
    State(state): State<Arc<AppState>>,
    ApiPath((clinica, especialidade)): ApiPath<(String, String)>,
) -> Result<Json<Vec<DoctorSchedule>>, AppError> {
    let doctors = state
        .service
        .list_doctors_from_specialty(&clinica, &especialidade)
        .await?;
    Ok(Json(doctors))
}

/// `POST /a/{clinica}/registar?paciente=&medico=&data=&hora=`
pub async fn register_appointment_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(clinica): ApiPath<String>,
    BookingQuery(params): BookingQuery,
) -> Result<(StatusCode, Json<StatusResponse>), AppError> {
    state
        .service
        .register_appointment(&clinica, &params)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(StatusResponse::success("Appointment registered successfully.")),
    ))
}

/// `POST /a/{clinica}/cancelar?paciente=&medico=&data=&hora=`
pub async fn cancel_appointment_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(clinica): ApiPath<String>,
    BookingQuery(params): BookingQuery,
) -> Result<Json<StatusResponse>, AppError> {
    state.service.cancel_appointment(&clinica, &params).await?;
    Ok(Json(StatusResponse::success(
        "Appointment canceled successfully.",
    )))
}

pub async fn ping_handler() -> Json<StatusResponse> {
    Json(StatusResponse::success("pong!"))
}

pub async fn health_check_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let health = state.service.health_check().await;
    Json(health)
}

pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    let health = state.service.health_check().await;
    match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Prometheus text exposition; 404 when no recorder was installed.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(DatabaseError::SlotUnavailable(_)) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = self.to_string();

        if status.is_server_error() {
            error!(error = ?self, message = %message, "Server error");
        }

        (status, Json(StatusResponse::error(message))).into_response()
    }
}
