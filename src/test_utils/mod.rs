//! Test utilities and mock implementations.
//!
//! This module provides an in-memory `DatabaseClient` and the fixture data
//! shared by unit and integration tests.

pub mod fixtures;
pub mod mocks;

pub use mocks::MockDatabaseClient;
