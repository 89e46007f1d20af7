pub mod jwt;
pub mod middleware;
pub mod routes;
pub mod service;

pub use middleware::{AdminUser, AuthUser};
pub use routes::routes;
