//! PostgreSQL database client implementation.

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::domain::{
    AppError, Appointment, AppointmentSlot, Clinic, DatabaseClient, DatabaseError, Doctor, Slot,
};

/// PostgreSQL connection pool configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 4,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// PostgreSQL database client with connection pooling
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client with custom configuration
    pub async fn new(database_url: &str, config: PostgresConfig) -> Result<Self, AppError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        info!(
            min = config.min_connections,
            max = config.max_connections,
            "Connected to PostgreSQL"
        );
        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client with default configuration
    pub async fn with_defaults(database_url: &str) -> Result<Self, AppError> {
        Self::new(database_url, PostgresConfig::default()).await
    }

    /// Run database migrations using sqlx migrate
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying connection pool (for testing)
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn exists(&self, sql: &str, key: &str) -> Result<bool, AppError> {
        let found: bool = sqlx::query_scalar(sql)
            .bind(key)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(found)
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_clinics(&self) -> Result<Vec<Clinic>, AppError> {
        let clinics = sqlx::query_as::<_, Clinic>(
            r#"
            SELECT nome, morada
            FROM clinica
            ORDER BY nome
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        debug!(rows = clinics.len(), "Fetched clinics");
        Ok(clinics)
    }

    #[instrument(skip(self))]
    async fn clinic_exists(&self, clinic: &str) -> Result<bool, AppError> {
        self.exists("SELECT EXISTS (SELECT 1 FROM clinica WHERE nome = $1)", clinic)
            .await
    }

    #[instrument(skip(self))]
    async fn patient_exists(&self, ssn: &str) -> Result<bool, AppError> {
        self.exists("SELECT EXISTS (SELECT 1 FROM paciente WHERE ssn = $1)", ssn)
            .await
    }

    #[instrument(skip(self))]
    async fn doctor_exists(&self, nif: &str) -> Result<bool, AppError> {
        self.exists("SELECT EXISTS (SELECT 1 FROM medico WHERE nif = $1)", nif)
            .await
    }

    #[instrument(skip(self))]
    async fn list_specialties(&self, clinic: &str) -> Result<Vec<String>, AppError> {
        let specialties: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT medico.especialidade
            FROM medico
            JOIN trabalha ON medico.nif = trabalha.nif
            WHERE trabalha.nome = $1
            ORDER BY medico.especialidade
            "#,
        )
        .bind(clinic)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        debug!(rows = specialties.len(), "Fetched specialties");
        Ok(specialties)
    }

    #[instrument(skip(self))]
    async fn list_doctors_with_availability(
        &self,
        clinic: &str,
        specialty: &str,
    ) -> Result<Vec<Doctor>, AppError> {
        let doctors = sqlx::query_as::<_, Doctor>(
            r#"
            SELECT DISTINCT medico.nif, medico.nome
            FROM medico
            JOIN horarios_disponiveis ON medico.nif = horarios_disponiveis.nif
            WHERE medico.especialidade = $1
              AND horarios_disponiveis.nome = $2
            ORDER BY medico.nome, medico.nif
            "#,
        )
        .bind(specialty)
        .bind(clinic)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        debug!(rows = doctors.len(), "Fetched doctors");
        Ok(doctors)
    }

    #[instrument(skip(self))]
    async fn next_available_slots(
        &self,
        clinic: &str,
        nif: &str,
        limit: i64,
    ) -> Result<Vec<Slot>, AppError> {
        let slots = sqlx::query_as::<_, Slot>(
            r#"
            SELECT data, hora
            FROM horarios_disponiveis
            WHERE nome = $1
              AND nif = $2
              AND data + hora > LOCALTIMESTAMP
            ORDER BY data, hora
            LIMIT $3
            "#,
        )
        .bind(clinic)
        .bind(nif)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(slots)
    }

    #[instrument(skip(self, slot), fields(clinic = %slot.clinica, nif = %slot.nif))]
    async fn create_appointment(&self, slot: &AppointmentSlot) -> Result<Appointment, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO consulta (ssn, nif, nome, data, hora)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, ssn, nif, nome, data, hora, codigo_sns
            "#,
        )
        .bind(&slot.ssn)
        .bind(&slot.nif)
        .bind(&slot.clinica)
        .bind(slot.data)
        .bind(slot.hora)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        debug!(id = appointment.id, "Inserted appointment");
        Ok(appointment)
    }

    #[instrument(skip(self, slot), fields(clinic = %slot.clinica, nif = %slot.nif))]
    async fn delete_appointment(&self, slot: &AppointmentSlot) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM consulta
            WHERE nome = $1
              AND ssn = $2
              AND nif = $3
              AND data = $4
              AND hora = $5
            "#,
        )
        .bind(&slot.clinica)
        .bind(&slot.ssn)
        .bind(&slot.nif)
        .bind(slot.data)
        .bind(slot.hora)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        debug!(rows = result.rows_affected(), "Deleted appointments");
        Ok(result.rows_affected() > 0)
    }
}
