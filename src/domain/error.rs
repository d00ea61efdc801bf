//! Application error types with proper error chaining.

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Unique constraint on `consulta (nome, nif, data, hora)`.
pub const SLOT_UNIQUE_CONSTRAINT: &str = "consulta_slot_key";

/// Raised by the `consulta` insert trigger when no opening is advertised.
pub const SLOT_OPEN_CONSTRAINT: &str = "consulta_slot_open";

#[derive(Error, Debug, Clone)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    Connection(String),
    /// Raw message from the database, surfaced verbatim.
    #[error("{0}")]
    Query(String),
    #[error("Schedule not available")]
    SlotUnavailable(String),
    #[error("Pool exhausted: {0}")]
    PoolExhausted(String),
    #[error("Migration failed: {0}")]
    Migration(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Query parameter missing or malformed.
    #[error("Invalid '{0}' value.")]
    InvalidField(String),
    /// Well-formed identifier that matches no row.
    #[error("{0} not found.")]
    UnknownReference(String),
    #[error("Invalid date and time. Must be after the moment.")]
    NotInFuture,
    /// Path or query string the router could not decode.
    #[error("{0}")]
    MalformedRequest(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted("Pool timed out".to_string()),
            sqlx::Error::Io(e) => DatabaseError::Connection(e.to_string()),
            sqlx::Error::Tls(e) => DatabaseError::Connection(e.to_string()),
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint();
                let slot_taken = match db_err.kind() {
                    ErrorKind::UniqueViolation => constraint == Some(SLOT_UNIQUE_CONSTRAINT),
                    ErrorKind::CheckViolation => constraint == Some(SLOT_OPEN_CONSTRAINT),
                    _ => false,
                };
                if slot_taken {
                    return DatabaseError::SlotUnavailable(db_err.message().to_string());
                }
                DatabaseError::Query(db_err.message().to_string())
            }
            _ => DatabaseError::Query(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DatabaseError::from(err))
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(DatabaseError::Migration(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_conversions() {
        let pool_timeout = DatabaseError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(pool_timeout, DatabaseError::PoolExhausted(_)));

        let not_found = DatabaseError::from(sqlx::Error::RowNotFound);
        assert!(matches!(not_found, DatabaseError::Query(_)));

        let generic = DatabaseError::from(sqlx::Error::WorkerCrashed);
        assert!(matches!(generic, DatabaseError::Query(_)));
    }

    #[test]
    fn test_io_error_is_connection_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = DatabaseError::from(sqlx::Error::Io(io));
        assert!(matches!(err, DatabaseError::Connection(_)));
    }

    #[test]
    fn test_database_error_display() {
        let err = DatabaseError::Connection("timeout".to_string());
        assert_eq!(err.to_string(), "Connection failed: timeout");

        let err = DatabaseError::Query("relation \"consulta\" does not exist".to_string());
        assert_eq!(err.to_string(), "relation \"consulta\" does not exist");

        let err = DatabaseError::SlotUnavailable("duplicate key".to_string());
        assert_eq!(err.to_string(), "Schedule not available");

        let err = DatabaseError::PoolExhausted("no connections".to_string());
        assert_eq!(err.to_string(), "Pool exhausted: no connections");

        let err = DatabaseError::Migration("failed".to_string());
        assert_eq!(err.to_string(), "Migration failed: failed");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::InvalidField("paciente".to_string());
        assert_eq!(err.to_string(), "Invalid 'paciente' value.");

        let err = ValidationError::UnknownReference("Médico".to_string());
        assert_eq!(err.to_string(), "Médico not found.");

        let err = ValidationError::NotInFuture;
        assert_eq!(
            err.to_string(),
            "Invalid date and time. Must be after the moment."
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "SERVER_ADDR".to_string(),
            message: "not a socket address".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for 'SERVER_ADDR': not a socket address"
        );
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Clinic: Norte not found.".to_string());
        assert_eq!(err.to_string(), "Clinic: Norte not found.");

        let err = AppError::Internal("panic".to_string());
        assert_eq!(err.to_string(), "Internal error: panic");

        let err: AppError = ValidationError::NotInFuture.into();
        assert_eq!(
            err.to_string(),
            "Invalid date and time. Must be after the moment."
        );
    }

    #[test]
    fn test_app_error_from_database_error() {
        let db_err = DatabaseError::SlotUnavailable("taken".to_string());
        let app_err: AppError = db_err.into();
        assert!(matches!(
            app_err,
            AppError::Database(DatabaseError::SlotUnavailable(_))
        ));
    }

    #[test]
    fn test_app_error_from_sqlx_error() {
        let app_err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(
            app_err,
            AppError::Database(DatabaseError::PoolExhausted(_))
        ));
    }

    #[test]
    fn test_app_error_from_migrate_error() {
        let mig_err = sqlx::migrate::MigrateError::VersionMissing(1);
        let app_err: AppError = mig_err.into();

        match app_err {
            AppError::Database(DatabaseError::Migration(msg)) => {
                assert!(msg.contains("migration 1 was previously applied"));
            }
            _ => panic!("Expected DatabaseError::Migration, got {:?}", app_err),
        }
    }
}
