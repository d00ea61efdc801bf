//! Application service layer.
//!
//! This module contains the booking workflow: it validates request
//! parameters, checks that referenced entities exist and delegates the
//! writes to the `DatabaseClient`, whose constraints settle slot
//! exclusivity.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, instrument, warn};

use crate::domain::validation::{self, is_nif, is_ssn, parse_date, parse_time};
use crate::domain::{
    AppError, Appointment, AppointmentParams, AppointmentSlot, Clinic, DatabaseClient,
    DatabaseError, DoctorSchedule, HealthResponse, HealthStatus, ValidationError,
};
use crate::infra::observability::{
    APPOINTMENT_CONFLICTS, APPOINTMENTS_CANCELLED, APPOINTMENTS_REGISTERED,
};

/// Number of upcoming slots listed per doctor.
pub const UPCOMING_SLOTS_PER_DOCTOR: i64 = 3;

/// Source of the current local wall-clock time.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Application service containing core business logic.
///
/// Holds the database client behind its trait so tests can inject
/// `MockDatabaseClient`.
pub struct AppService {
    db_client: Arc<dyn DatabaseClient>,
    clock: Clock,
}

impl AppService {
    /// Creates a new `AppService` reading the local system clock.
    #[must_use]
    pub fn new(db_client: Arc<dyn DatabaseClient>) -> Self {
        Self::with_clock(db_client, Arc::new(|| Local::now().naive_local()))
    }

    /// Creates a new `AppService` with an explicit clock.
    #[must_use]
    pub fn with_clock(db_client: Arc<dyn DatabaseClient>, clock: Clock) -> Self {
        Self { db_client, clock }
    }

    /// Lists every clinic with its address.
    ///
    /// # Errors
    ///
    /// `AppError::NotFound` when the network has no clinics.
    #[instrument(skip(self))]
    pub async fn list_clinics(&self) -> Result<Vec<Clinic>, AppError> {
        let clinics = self.db_client.list_clinics().await?;
        if clinics.is_empty() {
            return Err(AppError::NotFound("No clinics found.".to_string()));
        }
        debug!(count = clinics.len(), "Listed clinics");
        Ok(clinics)
    }

    /// Lists the specialties practised at a clinic.
    #[instrument(skip(self))]
    pub async fn list_specialties(&self, clinic: &str) -> Result<Vec<String>, AppError> {
        self.ensure_clinic(clinic).await?;

        let specialties = self.db_client.list_specialties(clinic).await?;
        if specialties.is_empty() {
            return Err(AppError::NotFound(format!(
                "No specialties found in: {clinic}."
            )));
        }
        Ok(specialties)
    }

    /// Lists doctors of a specialty available at a clinic, each with their
    /// next open slots there.
    #[instrument(skip(self))]
    pub async fn list_doctors_from_specialty(
        &self,
        clinic: &str,
        specialty: &str,
    ) -> Result<Vec<DoctorSchedule>, AppError> {
        self.ensure_clinic(clinic).await?;

        let doctors = self
            .db_client
            .list_doctors_with_availability(clinic, specialty)
            .await?;
        if doctors.is_empty() {
            return Err(AppError::NotFound(format!(
                "No doctors found in: {clinic} with specialty: {specialty}."
            )));
        }

        let mut schedules = Vec::with_capacity(doctors.len());
        for doctor in doctors {
            let slots = self
                .db_client
                .next_available_slots(clinic, &doctor.nif, UPCOMING_SLOTS_PER_DOCTOR)
                .await?;
            schedules.push(DoctorSchedule::new(doctor.nome, slots));
        }
        Ok(schedules)
    }

    /// Books an appointment at a clinic.
    ///
    /// # Errors
    ///
    /// - `AppError::Validation` for malformed, past or unknown references
    /// - `AppError::NotFound` for an unknown clinic
    /// - `DatabaseError::SlotUnavailable` when the slot is taken or was never advertised
    #[instrument(skip(self, params))]
    pub async fn register_appointment(
        &self,
        clinic: &str,
        params: &AppointmentParams,
    ) -> Result<Appointment, AppError> {
        let slot = self.validate_appointment(clinic, params).await?;

        match self.db_client.create_appointment(&slot).await {
            Ok(appointment) => {
                metrics::counter!(APPOINTMENTS_REGISTERED).increment(1);
                info!(
                    id = appointment.id,
                    codigo_sns = %appointment.codigo_sns,
                    "Appointment registered"
                );
                Ok(appointment)
            }
            Err(AppError::Database(DatabaseError::SlotUnavailable(detail))) => {
                metrics::counter!(APPOINTMENT_CONFLICTS).increment(1);
                warn!(%detail, "Slot not available");
                Err(AppError::Database(DatabaseError::SlotUnavailable(detail)))
            }
            Err(e) => Err(e),
        }
    }

    /// Cancels the appointment matching every request field.
    ///
    /// # Errors
    ///
    /// Same validation as [`AppService::register_appointment`];
    /// `AppError::NotFound` when no appointment matched.
    #[instrument(skip(self, params))]
    pub async fn cancel_appointment(
        &self,
        clinic: &str,
        params: &AppointmentParams,
    ) -> Result<(), AppError> {
        let slot = self.validate_appointment(clinic, params).await?;

        if !self.db_client.delete_appointment(&slot).await? {
            return Err(AppError::NotFound("Consulta not found.".to_string()));
        }

        metrics::counter!(APPOINTMENTS_CANCELLED).increment(1);
        info!(clinic = %slot.clinica, nif = %slot.nif, "Appointment canceled");
        Ok(())
    }

    /// Performs a health check on the database.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> HealthResponse {
        let db_health = match self.db_client.health_check().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = ?e, "Database health check failed");
                HealthStatus::Unhealthy
            }
        };

        HealthResponse::new(db_health)
    }

    /// Runs the booking validation chain.
    ///
    /// Lexical checks and the future check run before any query, so a
    /// malformed or past request never touches the database.
    async fn validate_appointment(
        &self,
        clinic: &str,
        params: &AppointmentParams,
    ) -> Result<AppointmentSlot, AppError> {
        let ssn = required(params.paciente.as_deref(), "paciente", is_ssn)?;
        let nif = required(params.medico.as_deref(), "medico", is_nif)?;
        let data = params
            .data
            .as_deref()
            .and_then(parse_date)
            .ok_or_else(|| invalid("data"))?;
        let hora = params
            .hora
            .as_deref()
            .and_then(parse_time)
            .ok_or_else(|| invalid("hora"))?;

        let now = validation::truncate_to_seconds((self.clock)());
        if data.and_time(hora) <= now {
            return Err(ValidationError::NotInFuture.into());
        }

        self.ensure_clinic(clinic).await?;

        if !self.db_client.patient_exists(ssn).await? {
            return Err(ValidationError::UnknownReference("paciente".to_string()).into());
        }
        if !self.db_client.doctor_exists(nif).await? {
            return Err(ValidationError::UnknownReference("Médico".to_string()).into());
        }

        Ok(AppointmentSlot {
            clinica: clinic.to_string(),
            ssn: ssn.to_string(),
            nif: nif.to_string(),
            data,
            hora,
        })
    }

    async fn ensure_clinic(&self, clinic: &str) -> Result<(), AppError> {
        if self.db_client.clinic_exists(clinic).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Clinic: {clinic} not found.")))
        }
    }
}

fn invalid(field: &str) -> AppError {
    ValidationError::InvalidField(field.to_string()).into()
}

fn required<'a>(
    value: Option<&'a str>,
    field: &str,
    is_valid: fn(&str) -> bool,
) -> Result<&'a str, AppError> {
    value.filter(|v| is_valid(v)).ok_or_else(|| invalid(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockDatabaseClient, fixtures};

    fn service_with(db: Arc<MockDatabaseClient>) -> AppService {
        AppService::with_clock(db, fixtures::clock())
    }

    fn booking() -> AppointmentParams {
        AppointmentParams::new(
            fixtures::PATIENT_SSN,
            fixtures::DOCTOR_NIF,
            "2030-01-02",
            "09:00:00",
        )
    }

    #[tokio::test]
    async fn test_list_clinics_empty_is_not_found() {
        let service = service_with(Arc::new(MockDatabaseClient::new()));

        let err = service.list_clinics().await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "No clinics found."));
    }

    #[tokio::test]
    async fn test_list_clinics() {
        let service = service_with(Arc::new(MockDatabaseClient::seeded()));

        let clinics = service.list_clinics().await.unwrap();
        assert_eq!(clinics.len(), 2);
        assert_eq!(clinics[0].nome, fixtures::CLINIC);
    }

    #[tokio::test]
    async fn test_list_specialties_unknown_clinic() {
        let service = service_with(Arc::new(MockDatabaseClient::seeded()));

        let err = service.list_specialties("Nowhere").await.unwrap_err();
        assert_eq!(err.to_string(), "Clinic: Nowhere not found.");
    }

    #[tokio::test]
    async fn test_list_specialties_clinic_without_doctors() {
        let service = service_with(Arc::new(MockDatabaseClient::seeded()));

        let err = service
            .list_specialties(fixtures::EMPTY_CLINIC)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("No specialties found in: {}.", fixtures::EMPTY_CLINIC)
        );
    }

    #[tokio::test]
    async fn test_list_specialties() {
        let service = service_with(Arc::new(MockDatabaseClient::seeded()));

        let specialties = service.list_specialties(fixtures::CLINIC).await.unwrap();
        assert_eq!(specialties, vec!["Cardiologia".to_string(), "Ortopedia".to_string()]);
    }

    #[tokio::test]
    async fn test_list_doctors_limits_slots_to_three() {
        let service = service_with(Arc::new(MockDatabaseClient::seeded()));

        let doctors = service
            .list_doctors_from_specialty(fixtures::CLINIC, "Cardiologia")
            .await
            .unwrap();

        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0].nome, "Ana Costa");
        assert_eq!(doctors[0].horarios_disponiveis.len(), 3);
        let slots = &doctors[0].horarios_disponiveis;
        assert!(slots.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(slots[0].0.to_string(), "2030-01-02");
    }

    #[tokio::test]
    async fn test_list_doctors_no_match() {
        let service = service_with(Arc::new(MockDatabaseClient::seeded()));

        let err = service
            .list_doctors_from_specialty(fixtures::CLINIC, "Pediatria")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "No doctors found in: {} with specialty: Pediatria.",
                fixtures::CLINIC
            )
        );
    }

    #[tokio::test]
    async fn test_register_appointment_success() {
        let db = Arc::new(MockDatabaseClient::seeded());
        let service = service_with(Arc::clone(&db));

        let appointment = service
            .register_appointment(fixtures::CLINIC, &booking())
            .await
            .unwrap();

        assert_eq!(appointment.id, 1);
        assert_eq!(appointment.codigo_sns, "000000000001");
        assert_eq!(db.appointments().len(), 1);
    }

    #[tokio::test]
    async fn test_register_same_slot_twice_conflicts() {
        let db = Arc::new(MockDatabaseClient::seeded());
        let service = service_with(Arc::clone(&db));

        service
            .register_appointment(fixtures::CLINIC, &booking())
            .await
            .unwrap();
        let err = service
            .register_appointment(fixtures::CLINIC, &booking())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Database(DatabaseError::SlotUnavailable(_))
        ));
        assert_eq!(err.to_string(), "Schedule not available");
        assert_eq!(db.appointments().len(), 1);
    }

    #[tokio::test]
    async fn test_register_unadvertised_slot_conflicts() {
        let service = service_with(Arc::new(MockDatabaseClient::seeded()));
        let params = AppointmentParams::new(
            fixtures::PATIENT_SSN,
            fixtures::DOCTOR_NIF,
            "2030-01-02",
            "03:00:00",
        );

        let err = service
            .register_appointment(fixtures::CLINIC, &params)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Database(DatabaseError::SlotUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_register_past_date_rejected_before_any_lookup() {
        let db = Arc::new(MockDatabaseClient::new());
        let service = service_with(Arc::clone(&db));
        let params = AppointmentParams::new(
            fixtures::PATIENT_SSN,
            fixtures::DOCTOR_NIF,
            "2029-12-31",
            "23:59:59",
        );

        let err = service
            .register_appointment("Unknown", &params)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Validation(ValidationError::NotInFuture)
        ));
        assert_eq!(db.call_count(), 0);
    }

    #[tokio::test]
    async fn test_register_at_current_second_is_not_future() {
        let service = service_with(Arc::new(MockDatabaseClient::seeded()));
        let params = AppointmentParams::new(
            fixtures::PATIENT_SSN,
            fixtures::DOCTOR_NIF,
            "2030-01-01",
            "12:00:00",
        );

        let err = service
            .register_appointment(fixtures::CLINIC, &params)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::NotInFuture)
        ));
    }

    #[tokio::test]
    async fn test_register_validation_order() {
        let service = service_with(Arc::new(MockDatabaseClient::seeded()));

        let cases = [
            (AppointmentParams::default(), "Invalid 'paciente' value."),
            (
                AppointmentParams::new("123", fixtures::DOCTOR_NIF, "2030-01-02", "09:00:00"),
                "Invalid 'paciente' value.",
            ),
            (
                AppointmentParams::new(fixtures::PATIENT_SSN, "12", "bad", "bad"),
                "Invalid 'medico' value.",
            ),
            (
                AppointmentParams::new(
                    fixtures::PATIENT_SSN,
                    fixtures::DOCTOR_NIF,
                    "2030-02-30",
                    "bad",
                ),
                "Invalid 'data' value.",
            ),
            (
                AppointmentParams::new(
                    fixtures::PATIENT_SSN,
                    fixtures::DOCTOR_NIF,
                    "2030-01-02",
                    "24:00:00",
                ),
                "Invalid 'hora' value.",
            ),
            (
                AppointmentParams::new(
                    "99999999999",
                    fixtures::DOCTOR_NIF,
                    "2030-01-02",
                    "09:00:00",
                ),
                "paciente not found.",
            ),
            (
                AppointmentParams::new(
                    fixtures::PATIENT_SSN,
                    "999999999",
                    "2030-01-02",
                    "09:00:00",
                ),
                "Médico not found.",
            ),
        ];

        for (params, expected) in cases {
            let err = service
                .register_appointment(fixtures::CLINIC, &params)
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), expected);
        }
    }

    #[tokio::test]
    async fn test_register_unknown_clinic() {
        let service = service_with(Arc::new(MockDatabaseClient::seeded()));

        let err = service
            .register_appointment("Nowhere", &booking())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), "Clinic: Nowhere not found.");
    }

    #[tokio::test]
    async fn test_register_database_failure_passes_through() {
        let service = service_with(Arc::new(MockDatabaseClient::failing("disk full")));

        let err = service
            .register_appointment(fixtures::CLINIC, &booking())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(DatabaseError::Query(_))));
        assert_eq!(err.to_string(), "disk full");
    }

    #[tokio::test]
    async fn test_cancel_appointment() {
        let db = Arc::new(MockDatabaseClient::seeded());
        let service = service_with(Arc::clone(&db));

        service
            .register_appointment(fixtures::CLINIC, &booking())
            .await
            .unwrap();
        service
            .cancel_appointment(fixtures::CLINIC, &booking())
            .await
            .unwrap();

        assert!(db.appointments().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_missing_appointment_is_not_found() {
        let service = service_with(Arc::new(MockDatabaseClient::seeded()));

        let err = service
            .cancel_appointment(fixtures::CLINIC, &booking())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Consulta not found."));
    }

    #[tokio::test]
    async fn test_cancel_frees_slot_for_rebooking() {
        let db = Arc::new(MockDatabaseClient::seeded());
        let service = service_with(Arc::clone(&db));

        service
            .register_appointment(fixtures::CLINIC, &booking())
            .await
            .unwrap();
        service
            .cancel_appointment(fixtures::CLINIC, &booking())
            .await
            .unwrap();
        let again = service
            .register_appointment(fixtures::CLINIC, &booking())
            .await
            .unwrap();

        assert_eq!(again.id, 2);
    }

    #[tokio::test]
    async fn test_health_check() {
        let db = Arc::new(MockDatabaseClient::new());
        let service = service_with(Arc::clone(&db));
        assert_eq!(service.health_check().await.status, HealthStatus::Healthy);

        db.set_healthy(false);
        let health = service.health_check().await;
        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert_eq!(health.database, HealthStatus::Unhealthy);
    }
}
