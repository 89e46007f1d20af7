pub mod routes;
pub mod storage;

pub use routes::routes;
