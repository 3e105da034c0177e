// errors.rs
use std::fmt;

/// Errors originating from the snapshot store or downstream layers (DB, IO).
#[derive(Debug)]
pub enum StoreError {
    DbError(String),
    IoError(String),
    InternalError,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DbError(msg) => write!(f, "Database Error: {msg}"),
            StoreError::IoError(msg) => write!(f, "IO Error: {msg}"),
            StoreError::InternalError => write!(f, "Internal Error"),
        }
    }
}

impl std::error::Error for StoreError {}
