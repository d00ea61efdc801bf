//! Mock implementations for testing.
//!
//! `MockDatabaseClient` keeps the clinic schema in memory and enforces the
//! same slot rules as the PostgreSQL schema: one appointment per
//! (clinic, doctor, date, time), and only on advertised openings.

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveTime};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::app::service::Clock;
use crate::domain::{
    AppError, Appointment, AppointmentSlot, Clinic, DatabaseClient, DatabaseError, Doctor, Slot,
};

/// Configuration for mock behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// If true, operations will fail.
    pub should_fail: bool,
    /// Custom error message for failures.
    pub error_message: Option<String>,
}

impl MockConfig {
    /// Creates a config that always succeeds.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// Creates a config that always fails.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone)]
struct MockDoctor {
    nome: String,
    especialidade: String,
}

type OpeningKey = (String, String, NaiveDate, NaiveTime);

#[derive(Debug, Default)]
struct Store {
    clinics: BTreeMap<String, Clinic>,
    doctors: BTreeMap<String, MockDoctor>,
    patients: HashSet<String>,
    works_at: HashSet<(String, String)>,
    openings: BTreeSet<OpeningKey>,
    appointments: Vec<Appointment>,
    last_id: i32,
    last_code: u64,
}

impl Store {
    fn is_booked(&self, key: &OpeningKey) -> bool {
        self.appointments.iter().any(|a| {
            a.clinica == key.0 && a.nif == key.1 && a.data == key.2 && a.hora == key.3
        })
    }

    fn open_slots<'a>(&'a self, clinic: &'a str) -> impl Iterator<Item = &'a OpeningKey> + 'a {
        self.openings
            .iter()
            .filter(move |key| key.0 == clinic && !self.is_booked(key))
    }
}

/// Mock database client for testing.
///
/// # Example
///
/// ```ignore
/// use clinic_booking_api::test_utils::{MockDatabaseClient, mocks::MockConfig};
///
/// // Empty store
/// let mock = MockDatabaseClient::new();
///
/// // Store populated with the shared fixtures, clock fixed at `fixtures::NOW`
/// let seeded = MockDatabaseClient::seeded();
///
/// // Every call fails
/// let failing_mock = MockDatabaseClient::with_config(MockConfig::failure("DB error"));
/// ```
pub struct MockDatabaseClient {
    store: Arc<Mutex<Store>>,
    config: MockConfig,
    clock: Clock,
    call_count: AtomicU64,
    is_healthy: AtomicBool,
}

impl MockDatabaseClient {
    /// Creates a new, empty mock with default (success) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a new mock with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            config,
            clock: Arc::new(|| Local::now().naive_local()),
            call_count: AtomicU64::new(0),
            is_healthy: AtomicBool::new(true),
        }
    }

    /// Creates a mock that always fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Replaces the clock that decides which openings are still ahead.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Creates a mock populated with [`super::fixtures`].
    #[must_use]
    pub fn seeded() -> Self {
        let mock = Self::new().with_clock(super::fixtures::clock());
        super::fixtures::seed(&mock);
        mock
    }

    pub fn add_clinic(&self, nome: &str, morada: &str) -> &Self {
        self.lock()
            .clinics
            .insert(nome.to_string(), Clinic::new(nome, morada));
        self
    }

    /// Registers a doctor and the clinic they work at.
    pub fn add_doctor(&self, nif: &str, nome: &str, especialidade: &str, clinic: &str) -> &Self {
        let mut store = self.lock();
        store.doctors.insert(
            nif.to_string(),
            MockDoctor {
                nome: nome.to_string(),
                especialidade: especialidade.to_string(),
            },
        );
        store
            .works_at
            .insert((nif.to_string(), clinic.to_string()));
        drop(store);
        self
    }

    pub fn add_patient(&self, ssn: &str) -> &Self {
        self.lock().patients.insert(ssn.to_string());
        self
    }

    /// Advertises an opening for a doctor at a clinic.
    pub fn add_opening(&self, clinic: &str, nif: &str, data: NaiveDate, hora: NaiveTime) -> &Self {
        self.lock()
            .openings
            .insert((clinic.to_string(), nif.to_string(), data, hora));
        self
    }

    /// Gets the number of times any trait method was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Sets the health status.
    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }

    /// Gets all stored appointments.
    pub fn appointments(&self) -> Vec<Appointment> {
        self.lock().appointments.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap()
    }

    fn increment_call_count(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }

    fn check_should_fail(&self) -> Result<(), AppError> {
        self.increment_call_count();
        if self.config.should_fail {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock database error".to_string());
            return Err(AppError::Database(DatabaseError::Query(msg)));
        }
        Ok(())
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn health_check(&self) -> Result<(), AppError> {
        self.increment_call_count();

        if !self.is_healthy.load(Ordering::Relaxed) {
            return Err(AppError::Database(DatabaseError::Connection(
                "Mock database unhealthy".to_string(),
            )));
        }
        Ok(())
    }

    async fn list_clinics(&self) -> Result<Vec<Clinic>, AppError> {
        self.check_should_fail()?;
        Ok(self.lock().clinics.values().cloned().collect())
    }

    async fn clinic_exists(&self, clinic: &str) -> Result<bool, AppError> {
        self.check_should_fail()?;
        Ok(self.lock().clinics.contains_key(clinic))
    }

    async fn patient_exists(&self, ssn: &str) -> Result<bool, AppError> {
        self.check_should_fail()?;
        Ok(self.lock().patients.contains(ssn))
    }

    async fn doctor_exists(&self, nif: &str) -> Result<bool, AppError> {
        self.check_should_fail()?;
        Ok(self.lock().doctors.contains_key(nif))
    }

    async fn list_specialties(&self, clinic: &str) -> Result<Vec<String>, AppError> {
        self.check_should_fail()?;
        let store = self.lock();
        let specialties: BTreeSet<String> = store
            .works_at
            .iter()
            .filter(|(_, c)| c == clinic)
            .filter_map(|(nif, _)| store.doctors.get(nif))
            .map(|d| d.especialidade.clone())
            .collect();
        Ok(specialties.into_iter().collect())
    }

    async fn list_doctors_with_availability(
        &self,
        clinic: &str,
        specialty: &str,
    ) -> Result<Vec<Doctor>, AppError> {
        self.check_should_fail()?;
        let store = self.lock();
        let nifs: BTreeSet<&String> = store.open_slots(clinic).map(|key| &key.1).collect();

        let mut doctors: Vec<Doctor> = nifs
            .into_iter()
            .filter_map(|nif| {
                store
                    .doctors
                    .get(nif)
                    .filter(|d| d.especialidade == specialty)
                    .map(|d| Doctor {
                        nif: nif.clone(),
                        nome: d.nome.clone(),
                    })
            })
            .collect();
        doctors.sort_by(|a, b| a.nome.cmp(&b.nome).then_with(|| a.nif.cmp(&b.nif)));
        Ok(doctors)
    }

    async fn next_available_slots(
        &self,
        clinic: &str,
        nif: &str,
        limit: i64,
    ) -> Result<Vec<Slot>, AppError> {
        self.check_should_fail()?;
        let now = (self.clock)();
        let store = self.lock();
        let limit = usize::try_from(limit).unwrap_or(0);

        // BTreeSet order already sorts by date, then time
        Ok(store
            .open_slots(clinic)
            .filter(|key| key.1 == nif && key.2.and_time(key.3) > now)
            .take(limit)
            .map(|key| Slot::new(key.2, key.3))
            .collect())
    }

    async fn create_appointment(&self, slot: &AppointmentSlot) -> Result<Appointment, AppError> {
        self.check_should_fail()?;
        let mut store = self.lock();
        let key = (slot.clinica.clone(), slot.nif.clone(), slot.data, slot.hora);

        if store.is_booked(&key) {
            return Err(AppError::Database(DatabaseError::SlotUnavailable(
                "duplicate key value violates unique constraint \"consulta_slot_key\"".to_string(),
            )));
        }
        if !store.openings.contains(&key) {
            return Err(AppError::Database(DatabaseError::SlotUnavailable(
                "Schedule not available".to_string(),
            )));
        }

        store.last_id += 1;
        store.last_code += 1;
        let appointment = Appointment {
            id: store.last_id,
            ssn: slot.ssn.clone(),
            nif: slot.nif.clone(),
            clinica: slot.clinica.clone(),
            data: slot.data,
            hora: slot.hora,
            codigo_sns: format!("{:012}", store.last_code),
        };
        store.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn delete_appointment(&self, slot: &AppointmentSlot) -> Result<bool, AppError> {
        self.check_should_fail()?;
        let mut store = self.lock();
        let before = store.appointments.len();
        store.appointments.retain(|a| {
            !(a.clinica == slot.clinica
                && a.ssn == slot.ssn
                && a.nif == slot.nif
                && a.data == slot.data
                && a.hora == slot.hora)
        });
        Ok(store.appointments.len() < before)
    }
}
