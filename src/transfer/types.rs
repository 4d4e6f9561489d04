//! Transfer requests, progress state and the payloads published to sinks

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Read/write chunk size for downloads (1 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Upload,
    Download,
}

/// Operation named in logs, events and error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Download,
    Upload,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Download => write!(f, "download"),
            Operation::Upload => write!(f, "upload"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

impl From<Direction> for Operation {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Upload => Operation::Upload,
            Direction::Download => Operation::Download,
        }
    }
}

/// Either end of a transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Location {
    Object { bucket: String, key: String },
    Local { path: PathBuf },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Object { bucket, key } => write!(f, "{}/{}", bucket, key),
            Location::Local { path } => write!(f, "{}", path.display()),
        }
    }
}

/// One upload or download. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    source: Location,
    destination: Location,
    expected_size: Option<u64>,
    direction: Direction,
}

impl TransferRequest {
    pub fn download(
        bucket: impl Into<String>,
        key: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: Location::Object {
                bucket: bucket.into(),
                key: key.into(),
            },
            destination: Location::Local {
                path: destination.into(),
            },
            expected_size: None,
            direction: Direction::Download,
        }
    }

    /// Upload `path` into `bucket`. Without an explicit key the file's base
    /// name is used.
    pub fn upload(path: impl Into<PathBuf>, bucket: impl Into<String>, key: Option<String>) -> Self {
        let path = path.into();
        let key = key.unwrap_or_else(|| base_name(&path));
        Self {
            source: Location::Local { path },
            destination: Location::Object {
                bucket: bucket.into(),
                key,
            },
            expected_size: None,
            direction: Direction::Upload,
        }
    }

    pub fn with_expected_size(mut self, size: u64) -> Self {
        self.expected_size = Some(size);
        self
    }

    pub fn source(&self) -> &Location {
        &self.source
    }

    pub fn destination(&self) -> &Location {
        &self.destination
    }

    pub fn expected_size(&self) -> Option<u64> {
        self.expected_size
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The remote end, rendered as `bucket/key`
    pub fn object_label(&self) -> String {
        match self.direction {
            Direction::Download => self.source.to_string(),
            Direction::Upload => self.destination.to_string(),
        }
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferStatus {
    InProgress,
    Succeeded,
    Failed,
}

impl TransferStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransferStatus::InProgress)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStatus::InProgress => write!(f, "in-progress"),
            TransferStatus::Succeeded => write!(f, "succeeded"),
            TransferStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Progress payload published to a sink
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub bytes_transferred: u64,
    pub total_size: Option<u64>,
    /// `None` when the total is unknown or zero
    pub fraction: Option<f64>,
}

impl ProgressUpdate {
    pub fn percent(&self) -> Option<u32> {
        self.fraction.map(|f| (f * 100.0).round() as u32)
    }
}

/// Progress of a single transfer, owned by the engine call running it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferProgress {
    bytes_transferred: u64,
    total_size: Option<u64>,
    status: TransferStatus,
}

impl TransferProgress {
    pub fn new(total_size: Option<u64>) -> Self {
        Self {
            bytes_transferred: 0,
            total_size,
            status: TransferStatus::InProgress,
        }
    }

    pub fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }

    pub fn total_size(&self) -> Option<u64> {
        self.total_size
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    /// Take the store's reported length as the total. The request hint only
    /// stands in when the store reports nothing usable.
    pub fn resolve_total(&mut self, reported: Option<u64>) {
        match reported {
            Some(len) if len > 0 => self.total_size = Some(len),
            _ if self.total_size.unwrap_or(0) == 0 => self.total_size = reported,
            _ => {}
        }
    }

    /// Count `bytes` more as transferred.
    ///
    /// A total that would be exceeded is wrong, so it is dropped and progress
    /// becomes indeterminate.
    pub fn advance(&mut self, bytes: u64) {
        self.bytes_transferred = self.bytes_transferred.saturating_add(bytes);
        if let Some(total) = self.total_size {
            if self.bytes_transferred > total {
                log::warn!(
                    "transfer_size_mismatch: expected={} received={}",
                    total,
                    self.bytes_transferred
                );
                self.total_size = None;
            }
        }
    }

    pub fn fraction(&self) -> Option<f64> {
        match self.total_size {
            Some(total) if total > 0 => {
                Some((self.bytes_transferred as f64 / total as f64).min(1.0))
            }
            _ => None,
        }
    }

    pub fn update(&self) -> ProgressUpdate {
        ProgressUpdate {
            bytes_transferred: self.bytes_transferred,
            total_size: self.total_size,
            fraction: self.fraction(),
        }
    }

    /// An update pinned to `fraction`, for transfers whose store call does
    /// not report byte-level progress
    pub fn milestone(&self, fraction: f64) -> ProgressUpdate {
        ProgressUpdate {
            bytes_transferred: self.bytes_transferred,
            total_size: self.total_size,
            fraction: Some(fraction),
        }
    }

    /// Move to a terminal status. Returns false if already terminal.
    pub fn finish(&mut self, status: TransferStatus) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        true
    }
}
