use super::types::Operation;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single transfer. Never fatal to the process.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Connectivity or protocol error reported by the store, including
    /// missing buckets and keys
    #[error("{operation} of {target} failed: {source}")]
    Store {
        operation: Operation,
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{operation} of {target} failed: error {action} {}: {source}", .path.display())]
    LocalIo {
        operation: Operation,
        target: String,
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{operation} request rejected: {reason}")]
    InvalidRequest {
        operation: Operation,
        reason: String,
    },
}

impl TransferError {
    pub fn operation(&self) -> Operation {
        match self {
            TransferError::Store { operation, .. }
            | TransferError::LocalIo { operation, .. }
            | TransferError::InvalidRequest { operation, .. } => *operation,
        }
    }

    pub(crate) fn invalid(operation: Operation, reason: impl Into<String>) -> Self {
        TransferError::InvalidRequest {
            operation,
            reason: reason.into(),
        }
    }
}
