use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("A user with email {0} already exists")]
    DuplicateEmail(String),
    #[error("Failed to write database file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize database: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
