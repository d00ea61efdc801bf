//! Clinic Booking API
//!
//! HTTP service for a network of medical clinics: browse clinics, their
//! specialties and doctors' upcoming openings, and book or cancel
//! appointments against a PostgreSQL database.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   API Layer                  │
//! │     HTTP handlers, routing, error mapping    │
//! ├─────────────────────────────────────────────┤
//! │               Application Layer              │
//! │  Booking workflow, validation chain, config  │
//! ├─────────────────────────────────────────────┤
//! │                 Domain Layer                 │
//! │     Traits, types, errors, validators        │
//! ├─────────────────────────────────────────────┤
//! │             Infrastructure Layer             │
//! │   PostgreSQL adapter, tracing and metrics    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Storage sits behind the [`domain::DatabaseClient`] trait so the service
//! and router can be exercised with the in-memory mock from `test_utils`.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use clinic_booking_api::api::create_router;
//! use clinic_booking_api::app::AppState;
//! use clinic_booking_api::infra::PostgresClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(PostgresClient::with_defaults(&database_url).await?);
//!     let state = Arc::new(AppState::new(db));
//!
//!     let router = create_router(state);
//!     axum::serve(listener, router).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod domain;
pub mod infra;

// Test utilities are available in tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
