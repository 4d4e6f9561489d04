//! Rules for which listing entries can be acted on

use crate::transfer::Operation;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Choose a file to {0}")]
    NotAFile(Operation),
}

/// Accept `key` only if it names a file, not a virtual folder
pub fn file_key(key: &str, operation: Operation) -> Result<&str, SelectionError> {
    if key.is_empty() || key.ends_with('/') {
        return Err(SelectionError::NotAFile(operation));
    }
    Ok(key)
}

/// Local file name suggested for downloading `key`
pub fn default_destination(key: &str) -> PathBuf {
    let name = key.rsplit('/').next().unwrap_or(key);
    PathBuf::from(name)
}
