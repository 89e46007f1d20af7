//! Flat-file record store for WaizVault.
//!
//! Users, resources, progress entries, announcements and analytics events are
//! kept in one JSON document. See [`RecordStore`].

pub mod error;
pub mod models;
pub mod repositories;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{LoadOutcome, RecordStore};
