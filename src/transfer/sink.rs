use super::types::{ProgressUpdate, TransferStatus};
use log::{debug, info, warn};

/// Receiver of progress for one transfer.
///
/// Updates arrive in non-decreasing byte order and the terminal
/// notification is always the last call, made exactly once.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, update: &ProgressUpdate);

    fn on_terminal(&self, status: TransferStatus, error: Option<&str>);
}

/// Sink that only writes progress to the log
#[derive(Debug, Clone)]
pub struct LogSink {
    label: String,
}

impl LogSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl ProgressSink for LogSink {
    fn on_progress(&self, update: &ProgressUpdate) {
        match update.percent() {
            Some(percent) => debug!(
                "transfer_progress: {} percent={} bytes={}",
                self.label, percent, update.bytes_transferred
            ),
            None => debug!(
                "transfer_progress: {} bytes={}",
                self.label, update.bytes_transferred
            ),
        }
    }

    fn on_terminal(&self, status: TransferStatus, error: Option<&str>) {
        match error {
            Some(err) => warn!("transfer_{}: {} error={}", status, self.label, err),
            None => info!("transfer_{}: {}", status, self.label),
        }
    }
}
