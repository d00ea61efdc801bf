//! Infrastructure layer implementations.

pub mod database;
pub mod observability;

pub use database::{PostgresClient, PostgresConfig};
pub use observability::{LogFormat, PrometheusHandle, init_metrics_handle, init_tracing};
