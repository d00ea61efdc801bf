use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Clinic name, the natural key of `clinica`.
pub type ClinicName = String;

/// Patient social security number (11 digits).
pub type Ssn = String;

/// Doctor tax number (9 digits).
pub type Nif = String;

/// A clinic of the network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Clinic {
    pub nome: ClinicName,
    pub morada: String,
}

impl Clinic {
    pub fn new(nome: impl Into<String>, morada: impl Into<String>) -> Self {
        Self {
            nome: nome.into(),
            morada: morada.into(),
        }
    }
}

/// A doctor reference as returned by availability lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Doctor {
    pub nif: Nif,
    pub nome: String,
}

/// An open (date, time) pair for a doctor at a clinic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, sqlx::FromRow)]
pub struct Slot {
    pub data: NaiveDate,
    pub hora: NaiveTime,
}

impl Slot {
    pub fn new(data: NaiveDate, hora: NaiveTime) -> Self {
        Self { data, hora }
    }
}

/// A doctor together with their soonest open slots at one clinic.
///
/// Slots serialize as `["YYYY-MM-DD", "HH:MM:SS"]` pairs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorSchedule {
    pub nome: String,
    pub horarios_disponiveis: Vec<(NaiveDate, NaiveTime)>,
}

impl DoctorSchedule {
    pub fn new(nome: String, slots: Vec<Slot>) -> Self {
        Self {
            nome,
            horarios_disponiveis: slots.into_iter().map(|s| (s.data, s.hora)).collect(),
        }
    }
}

/// Raw query parameters of the booking and cancellation endpoints.
///
/// Everything is optional here; the service rejects missing values with
/// the same message as malformed ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentParams {
    pub paciente: Option<String>,
    pub medico: Option<String>,
    pub data: Option<String>,
    pub hora: Option<String>,
}

impl AppointmentParams {
    pub fn new(paciente: &str, medico: &str, data: &str, hora: &str) -> Self {
        Self {
            paciente: Some(paciente.to_string()),
            medico: Some(medico.to_string()),
            data: Some(data.to_string()),
            hora: Some(hora.to_string()),
        }
    }

    /// Builds the parameters from decoded query pairs.
    ///
    /// A repeated key keeps its first value; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "paciente" => &mut params.paciente,
                "medico" => &mut params.medico,
                "data" => &mut params.data,
                "hora" => &mut params.hora,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

/// A fully validated (clinic, patient, doctor, date, time) tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentSlot {
    pub clinica: ClinicName,
    pub ssn: Ssn,
    pub nif: Nif,
    pub data: NaiveDate,
    pub hora: NaiveTime,
}

/// A persisted appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Appointment {
    pub id: i32,
    pub ssn: Ssn,
    pub nif: Nif,
    #[sqlx(rename = "nome")]
    pub clinica: ClinicName,
    pub data: NaiveDate,
    pub hora: NaiveTime,
    pub codigo_sns: String,
}

/// Outcome marker of the JSON envelope.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// The `{message, status}` envelope shared by all endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub message: String,
    pub status: ResponseStatus,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: ResponseStatus::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: ResponseStatus::Error,
        }
    }
}

/// Health check status for services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Health check response for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub database: HealthStatus,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn new(database: HealthStatus) -> Self {
        Self {
            status: database.clone(),
            database,
            timestamp: Utc::now(),
        }
    }
}
