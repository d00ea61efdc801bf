//! Application layer containing business logic, configuration and shared state.

pub mod config;
pub mod service;
pub mod state;

pub use config::AppConfig;
pub use service::AppService;
pub use state::AppState;
