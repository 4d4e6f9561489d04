//! Commands accepted by a browser session and the events it emits

use crate::providers::{Bucket, ObjectEntry};
use crate::transfer::{Operation, ProgressUpdate, TransferStatus};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Identifies one transfer or delete within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TransferId(pub u64);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ListBuckets,
    /// List the first page of a bucket
    OpenBucket {
        bucket: String,
    },
    /// Download a key; without a destination the key's base name is used
    Download {
        bucket: String,
        key: String,
        destination: Option<PathBuf>,
    },
    Upload {
        bucket: String,
        path: PathBuf,
        key: Option<String>,
    },
    Delete {
        bucket: String,
        key: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Event {
    Buckets {
        buckets: Vec<Bucket>,
    },
    Listing {
        bucket: String,
        entries: Vec<ObjectEntry>,
    },
    ListingFailed {
        bucket: Option<String>,
        message: String,
    },
    /// A command was refused before reaching the store
    Rejected {
        message: String,
    },
    Started {
        id: TransferId,
        operation: Operation,
        target: String,
    },
    Progress {
        id: TransferId,
        update: ProgressUpdate,
    },
    Finished {
        id: TransferId,
        operation: Operation,
        target: String,
        status: TransferStatus,
        error: Option<String>,
    },
}
