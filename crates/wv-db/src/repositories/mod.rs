// Each module extends `RecordStore` with the operations for one collection.
// Lookups are linear scans; writes go through `mutate`/`mutate_existing` so
// they hold the write lock until the document is on disk.

pub mod analytics;
pub mod announcement;
pub mod progress;
pub mod resource;
pub mod stats;
pub mod user;
