//! Domain traits defining contracts for external systems.

use async_trait::async_trait;

use super::error::AppError;
use super::types::{Appointment, AppointmentSlot, Clinic, Doctor, Slot};

/// Database client trait for the clinic schema.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Check database connectivity
    async fn health_check(&self) -> Result<(), AppError>;

    /// All clinics, ordered by name
    async fn list_clinics(&self) -> Result<Vec<Clinic>, AppError>;

    async fn clinic_exists(&self, clinic: &str) -> Result<bool, AppError>;

    async fn patient_exists(&self, ssn: &str) -> Result<bool, AppError>;

    async fn doctor_exists(&self, nif: &str) -> Result<bool, AppError>;

    /// Distinct specialties of the doctors working at a clinic
    async fn list_specialties(&self, clinic: &str) -> Result<Vec<String>, AppError>;

    /// Doctors of a specialty with at least one open slot at a clinic
    async fn list_doctors_with_availability(
        &self,
        clinic: &str,
        specialty: &str,
    ) -> Result<Vec<Doctor>, AppError>;

    /// The soonest open slots after the current time, by date then time
    async fn next_available_slots(
        &self,
        clinic: &str,
        nif: &str,
        limit: i64,
    ) -> Result<Vec<Slot>, AppError>;

    /// Insert an appointment; id and public code are generated by the store.
    ///
    /// A slot that is taken or was never advertised fails with
    /// `DatabaseError::SlotUnavailable`.
    async fn create_appointment(&self, slot: &AppointmentSlot) -> Result<Appointment, AppError>;

    /// Delete the appointment matching every field; `false` if none did.
    async fn delete_appointment(&self, slot: &AppointmentSlot) -> Result<bool, AppError>;
}
