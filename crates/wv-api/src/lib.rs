pub mod admin;
pub mod analytics;
pub mod announcement;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod progress;
pub mod resource;
pub mod router;
pub mod state;
pub mod tracing;
pub mod user;
pub mod validation;

pub use config::ApiConfig;
pub use state::ApiState;
