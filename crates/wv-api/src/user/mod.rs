pub mod model;

pub use model::UserResponse;
