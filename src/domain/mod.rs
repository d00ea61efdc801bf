//! Domain layer containing core business types, traits, validators and error definitions.

pub mod error;
pub mod traits;
pub mod types;
pub mod validation;

pub use error::{AppError, ConfigError, DatabaseError, ValidationError};
pub use traits::DatabaseClient;
pub use types::{
    Appointment, AppointmentParams, AppointmentSlot, Clinic, Doctor, DoctorSchedule,
    HealthResponse, HealthStatus, ResponseStatus, Slot, StatusResponse,
};
