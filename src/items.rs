// src/items.rs

use crate::errors::StoreError;
use std::fs;
use std::path::Path;

/// Reads the tracked item list. The file is externally editable between
/// runs; within one run the list is fixed. A missing file is initialized
/// to an empty list so the first run doesn't need manual setup.
pub fn read_items(path: &str) -> Result<Vec<String>, StoreError> {
    if !Path::new(path).exists() {
        fs::write(path, "[]")
            .map_err(|e| StoreError::IoError(format!("Failed to create {path}: {e}")))?;
        return Ok(Vec::new());
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| StoreError::IoError(format!("Failed to read {path}: {e}")))?;

    serde_json::from_str(&raw)
        .map_err(|e| StoreError::IoError(format!("Failed to parse {path}: {e}")))
}
