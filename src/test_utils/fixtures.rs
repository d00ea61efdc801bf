//! Fixture data loaded by `MockDatabaseClient::seeded`.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::MockDatabaseClient;
use crate::app::service::Clock;
use crate::app::{AppService, AppState};

pub const CLINIC: &str = "Clínica Central";
pub const CLINIC_ADDRESS: &str = "Rua Augusta 10, 1100-053 Lisboa";
/// A clinic where nobody works.
pub const EMPTY_CLINIC: &str = "Clínica Norte";

pub const PATIENT_SSN: &str = "12345678901";
pub const OTHER_PATIENT_SSN: &str = "10987654321";

/// Cardiologist at `CLINIC` with four future openings and one past one.
pub const DOCTOR_NIF: &str = "123456789";
/// Orthopedist at `CLINIC` with no openings.
pub const ORTHOPEDIST_NIF: &str = "987654321";

pub const PAST_OPENING_DATE: &str = "2020-01-06";

/// The instant seeded mocks and fixture services treat as "now".
pub const NOW: (&str, &str) = ("2030-01-01", "12:00:00");

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M:%S").unwrap()
}

pub fn at(d: &str, t: &str) -> NaiveDateTime {
    date(d).and_time(time(t))
}

/// A clock frozen at [`NOW`].
pub fn clock() -> Clock {
    Arc::new(|| at(NOW.0, NOW.1))
}

/// Application state whose service reads [`clock`].
pub fn app_state(mock: Arc<MockDatabaseClient>) -> AppState {
    AppState::with_service(Arc::new(AppService::with_clock(mock, clock())))
}

pub fn seed(mock: &MockDatabaseClient) {
    mock.add_clinic(CLINIC, CLINIC_ADDRESS)
        .add_clinic(EMPTY_CLINIC, "Avenida da Boavista 200, 4100-119 Porto")
        .add_patient(PATIENT_SSN)
        .add_patient(OTHER_PATIENT_SSN)
        .add_doctor(DOCTOR_NIF, "Ana Costa", "Cardiologia", CLINIC)
        .add_doctor(ORTHOPEDIST_NIF, "Bruno Dias", "Ortopedia", CLINIC);

    for (d, t) in [
        (PAST_OPENING_DATE, "09:00:00"),
        ("2030-01-02", "09:00:00"),
        ("2030-01-02", "10:00:00"),
        ("2030-01-02", "11:00:00"),
        ("2030-01-03", "09:00:00"),
    ] {
        mock.add_opening(CLINIC, DOCTOR_NIF, date(d), time(t));
    }
}
