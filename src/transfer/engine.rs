//! Streaming transfer engine: chunked downloads, whole-body uploads, deletes

use super::error::TransferError;
use super::sink::ProgressSink;
use super::types::{
    Direction, Location, Operation, TransferProgress, TransferRequest, TransferStatus,
    DEFAULT_CHUNK_SIZE,
};
use crate::providers::{ObjectDownload, ObjectStore};
use log::{info, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

/// Moves the content of one object at a time between the store and local
/// files. Each call runs to completion on the calling task; there is no
/// retry and no cancellation.
pub struct TransferEngine<S: ?Sized> {
    store: Arc<S>,
    chunk_size: usize,
}

impl<S: ?Sized> Clone for TransferEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            chunk_size: self.chunk_size,
        }
    }
}

impl<S: ObjectStore + ?Sized> TransferEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Stream `bucket/key` into the local destination of `request`.
    ///
    /// A partially written destination is left in place on failure.
    pub async fn download(
        &self,
        request: &TransferRequest,
        sink: &dyn ProgressSink,
    ) -> Result<(), TransferError> {
        let mut progress = TransferProgress::new(request.expected_size());
        let result = self.run_download(request, &mut progress, sink).await;
        finish(&mut progress, &result, sink);
        result
    }

    /// Put the local source of `request` as a single object write.
    pub async fn upload(
        &self,
        request: &TransferRequest,
        sink: &dyn ProgressSink,
    ) -> Result<(), TransferError> {
        let mut progress = TransferProgress::new(request.expected_size());
        let result = self.run_upload(request, &mut progress, sink).await;
        finish(&mut progress, &result, sink);
        result
    }

    /// Run `request` in whichever direction it names
    pub async fn transfer(
        &self,
        request: &TransferRequest,
        sink: &dyn ProgressSink,
    ) -> Result<(), TransferError> {
        match request.direction() {
            Direction::Download => self.download(request, sink).await,
            Direction::Upload => self.upload(request, sink).await,
        }
    }

    /// Delete one object. The store's outcome is passed through as-is, so
    /// deleting an absent key is whatever the store reports it to be.
    pub async fn delete(&self, bucket: &str, key: &str) -> Result<(), TransferError> {
        let target = format!("{}/{}", bucket, key);
        info!("delete_start: {}", target);
        self.store
            .delete_object(bucket, key)
            .await
            .map_err(|source| TransferError::Store {
                operation: Operation::Delete,
                target: target.clone(),
                source,
            })?;
        info!("delete_finish: {}", target);
        Ok(())
    }

    async fn run_download(
        &self,
        request: &TransferRequest,
        progress: &mut TransferProgress,
        sink: &dyn ProgressSink,
    ) -> Result<(), TransferError> {
        let op = Operation::Download;
        if request.direction() != Direction::Download {
            return Err(TransferError::invalid(op, "not a download request"));
        }
        let Location::Object { bucket, key } = request.source() else {
            return Err(TransferError::invalid(op, "source must be an object"));
        };
        let destination = match request.destination() {
            Location::Local { path } if !path.as_os_str().is_empty() => path,
            _ => {
                return Err(TransferError::invalid(
                    op,
                    "destination must be a non-empty local path",
                ))
            }
        };
        let destination = destination.as_path();
        let target = request.object_label();
        info!(
            "download_start: {} destination={}",
            target,
            destination.display()
        );

        let ObjectDownload {
            mut body,
            content_length,
        } = self
            .store
            .get_object(bucket, key)
            .await
            .map_err(|source| TransferError::Store {
                operation: op,
                target: target.clone(),
                source,
            })?;
        progress.resolve_total(content_length);

        let local_io = |action: &'static str, path: &Path| {
            let target = target.clone();
            let path = path.to_path_buf();
            move |source: io::Error| TransferError::LocalIo {
                operation: op,
                target,
                action,
                path,
                source,
            }
        };

        if let Some(parent) = destination
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(local_io("creating directory", parent))?;
        }

        let mut file = File::create(destination)
            .await
            .map_err(local_io("creating file", destination))?;

        let mut buffer = vec![0u8; self.chunk_size];
        loop {
            let (filled, eof) = fill_chunk(&mut body, &mut buffer).await.map_err(|e| {
                TransferError::Store {
                    operation: op,
                    target: target.clone(),
                    source: Box::new(e),
                }
            })?;

            if filled > 0 {
                file.write_all(&buffer[..filled])
                    .await
                    .map_err(local_io("writing file", destination))?;
                progress.advance(filled as u64);
                sink.on_progress(&progress.update());
            }

            if eof {
                break;
            }
        }

        file.flush()
            .await
            .map_err(local_io("flushing file", destination))?;

        info!(
            "download_finish: {} bytes={} total_bytes={:?}",
            target,
            progress.bytes_transferred(),
            progress.total_size()
        );
        Ok(())
    }

    async fn run_upload(
        &self,
        request: &TransferRequest,
        progress: &mut TransferProgress,
        sink: &dyn ProgressSink,
    ) -> Result<(), TransferError> {
        let op = Operation::Upload;
        if request.direction() != Direction::Upload {
            return Err(TransferError::invalid(op, "not an upload request"));
        }
        let Location::Local { path } = request.source() else {
            return Err(TransferError::invalid(op, "source must be a local path"));
        };
        let (bucket, key) = match request.destination() {
            Location::Object { bucket, key } if !key.is_empty() => (bucket, key),
            _ => {
                return Err(TransferError::invalid(
                    op,
                    format!("no object key for {}", path.display()),
                ))
            }
        };
        let target = request.object_label();
        info!("upload_start: {} source={}", target, path.display());

        let local_io = |action: &'static str, path: &PathBuf| {
            let target = target.clone();
            let path = path.clone();
            move |source: io::Error| TransferError::LocalIo {
                operation: op,
                target,
                action,
                path,
                source,
            }
        };

        let file = File::open(path)
            .await
            .map_err(local_io("opening file", path))?;
        let metadata = file
            .metadata()
            .await
            .map_err(local_io("reading file information", path))?;
        if metadata.is_dir() {
            return Err(TransferError::invalid(
                op,
                format!("{} is a directory", path.display()),
            ));
        }
        let size = metadata.len();
        progress.resolve_total(Some(size));

        sink.on_progress(&progress.milestone(0.0));

        // The file handle moves into the store call and is closed when it returns
        self.store
            .put_object(bucket, key, file, size)
            .await
            .map_err(|source| TransferError::Store {
                operation: op,
                target: target.clone(),
                source,
            })?;

        progress.advance(size);
        sink.on_progress(&progress.milestone(1.0));
        info!("upload_finish: {} bytes={}", target, size);
        Ok(())
    }
}

/// Publish the terminal notification for a finished transfer
fn finish(
    progress: &mut TransferProgress,
    result: &Result<(), TransferError>,
    sink: &dyn ProgressSink,
) {
    match result {
        Ok(()) => {
            if progress.finish(TransferStatus::Succeeded) {
                sink.on_terminal(TransferStatus::Succeeded, None);
            }
        }
        Err(err) => {
            warn!("{}", err);
            if progress.finish(TransferStatus::Failed) {
                sink.on_terminal(TransferStatus::Failed, Some(&err.to_string()));
            }
        }
    }
}

/// Read until `buffer` is full or the stream ends. Returns the bytes read
/// and whether the end of the stream was reached.
async fn fill_chunk<R>(reader: &mut R, buffer: &mut [u8]) -> io::Result<(usize, bool)>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buffer.len() {
        let n = reader.read(&mut buffer[filled..]).await?;
        if n == 0 {
            return Ok((filled, true));
        }
        filled += n;
    }
    Ok((filled, false))
}
