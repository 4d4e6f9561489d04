//! Browser session worker: runs commands against the engine and reports
//! results as events

use super::listings::Listings;
use super::selection;
use super::types::{Command, Event, TransferId};
use crate::providers::{ObjectEntry, ObjectStore};
use crate::transfer::{
    Location, LogSink, Operation, ProgressSink, ProgressUpdate, TransferEngine, TransferRequest,
    TransferStatus,
};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::SendError, UnboundedReceiver, UnboundedSender};

/// Front door of a running session
#[derive(Debug, Clone)]
pub struct BrowserHandle {
    commands: UnboundedSender<Command>,
    listings: Arc<Listings>,
}

impl BrowserHandle {
    pub fn send(&self, command: Command) -> Result<(), SendError<Command>> {
        self.commands.send(command)
    }

    /// Latest listing of `bucket` seen by this session
    pub fn listing(&self, bucket: &str) -> Option<Vec<ObjectEntry>> {
        self.listings.get(bucket)
    }
}

pub struct Browser;

impl Browser {
    /// Start a session on the current tokio runtime.
    ///
    /// Every command runs on its own task, so a long transfer never holds up
    /// listings or other transfers. The event stream ends once all handles
    /// are dropped and the remaining work has finished.
    pub fn spawn<S>(engine: TransferEngine<S>) -> (BrowserHandle, UnboundedReceiver<Event>)
    where
        S: ObjectStore + ?Sized + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let listings = Arc::new(Listings::default());

        tokio::spawn(run(engine, command_rx, event_tx, listings.clone()));

        (
            BrowserHandle {
                commands: command_tx,
                listings,
            },
            event_rx,
        )
    }
}

struct Context<S: ?Sized> {
    engine: TransferEngine<S>,
    events: UnboundedSender<Event>,
    listings: Arc<Listings>,
}

impl<S: ?Sized> Clone for Context<S> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            events: self.events.clone(),
            listings: self.listings.clone(),
        }
    }
}

impl<S: ?Sized> Context<S> {
    fn emit(&self, event: Event) {
        // A closed receiver just means nobody is watching any more
        let _ = self.events.send(event);
    }
}

async fn run<S>(
    engine: TransferEngine<S>,
    mut commands: UnboundedReceiver<Command>,
    events: UnboundedSender<Event>,
    listings: Arc<Listings>,
) where
    S: ObjectStore + ?Sized + 'static,
{
    let ctx = Context {
        engine,
        events,
        listings,
    };
    let mut next_id = 0u64;
    let mut next_transfer_id = || {
        next_id += 1;
        TransferId(next_id)
    };

    while let Some(command) = commands.recv().await {
        debug!("browser_command: {:?}", command);
        let ctx = ctx.clone();
        match command {
            Command::ListBuckets => {
                tokio::spawn(list_buckets(ctx));
            }
            Command::OpenBucket { bucket } => {
                tokio::spawn(async move { refresh_listing(&ctx, &bucket).await });
            }
            Command::Download {
                bucket,
                key,
                destination,
            } => {
                let key = match selection::file_key(&key, Operation::Download) {
                    Ok(key) => key.to_string(),
                    Err(err) => {
                        ctx.emit(Event::Rejected {
                            message: err.to_string(),
                        });
                        continue;
                    }
                };
                let destination =
                    destination.unwrap_or_else(|| selection::default_destination(&key));
                let id = next_transfer_id();
                tokio::spawn(download(ctx, id, bucket, key, destination));
            }
            Command::Upload { bucket, path, key } => {
                let request = TransferRequest::upload(path, bucket, key);
                let id = next_transfer_id();
                tokio::spawn(upload(ctx, id, request));
            }
            Command::Delete { bucket, key } => {
                if let Err(err) = selection::file_key(&key, Operation::Delete) {
                    ctx.emit(Event::Rejected {
                        message: err.to_string(),
                    });
                    continue;
                }
                let id = next_transfer_id();
                tokio::spawn(delete(ctx, id, bucket, key));
            }
        }
    }
    debug!("browser_session_closed");
}

async fn list_buckets<S>(ctx: Context<S>)
where
    S: ObjectStore + ?Sized,
{
    match ctx.engine.store().list_buckets().await {
        Ok(buckets) => {
            info!("list_buckets: count={}", buckets.len());
            ctx.emit(Event::Buckets { buckets });
        }
        Err(err) => {
            warn!("unable to list buckets, {}", err);
            ctx.emit(Event::ListingFailed {
                bucket: None,
                message: format!("unable to list buckets: {}", err),
            });
        }
    }
}

async fn refresh_listing<S>(ctx: &Context<S>, bucket: &str)
where
    S: ObjectStore + ?Sized,
{
    let seq = ctx.listings.begin();
    match ctx.engine.store().list_objects(bucket).await {
        Ok(entries) => {
            info!("list_objects: bucket={} count={}", bucket, entries.len());
            if !ctx.listings.publish(bucket, seq, entries.clone()) {
                debug!("list_objects_superseded: bucket={} seq={}", bucket, seq);
                return;
            }
            ctx.emit(Event::Listing {
                bucket: bucket.to_string(),
                entries,
            });
        }
        Err(err) => {
            warn!("unable to list objects for bucket {}, {}", bucket, err);
            ctx.emit(Event::ListingFailed {
                bucket: Some(bucket.to_string()),
                message: format!("unable to list objects for bucket {}: {}", bucket, err),
            });
        }
    }
}

async fn download<S>(
    ctx: Context<S>,
    id: TransferId,
    bucket: String,
    key: String,
    destination: PathBuf,
) where
    S: ObjectStore + ?Sized,
{
    let mut request = TransferRequest::download(bucket.as_str(), key.as_str(), destination);
    if let Some(size) = ctx.listings.size_of(&bucket, &key) {
        request = request.with_expected_size(size);
    }

    let sink = ChannelSink::start(&ctx, id, Operation::Download, request.object_label());
    // The outcome reaches the event stream through the sink
    let _ = ctx.engine.download(&request, &sink).await;
}

async fn upload<S>(ctx: Context<S>, id: TransferId, request: TransferRequest)
where
    S: ObjectStore + ?Sized,
{
    let sink = ChannelSink::start(&ctx, id, Operation::Upload, request.object_label());
    if ctx.engine.upload(&request, &sink).await.is_ok() {
        if let Location::Object { bucket, .. } = request.destination() {
            refresh_listing(&ctx, bucket).await;
        }
    }
}

async fn delete<S>(ctx: Context<S>, id: TransferId, bucket: String, key: String)
where
    S: ObjectStore + ?Sized,
{
    let target = format!("{}/{}", bucket, key);
    ctx.emit(Event::Started {
        id,
        operation: Operation::Delete,
        target: target.clone(),
    });

    let result = ctx.engine.delete(&bucket, &key).await;
    let (status, error) = match &result {
        Ok(()) => (TransferStatus::Succeeded, None),
        Err(err) => (TransferStatus::Failed, Some(err.to_string())),
    };
    ctx.emit(Event::Finished {
        id,
        operation: Operation::Delete,
        target,
        status,
        error,
    });

    if result.is_ok() {
        refresh_listing(&ctx, &bucket).await;
    }
}

/// Forwards engine progress for one transfer onto the event channel
struct ChannelSink {
    id: TransferId,
    operation: Operation,
    target: String,
    events: UnboundedSender<Event>,
    log: LogSink,
}

impl ChannelSink {
    fn start<S: ?Sized>(
        ctx: &Context<S>,
        id: TransferId,
        operation: Operation,
        target: String,
    ) -> Self {
        ctx.emit(Event::Started {
            id,
            operation,
            target: target.clone(),
        });
        Self {
            id,
            operation,
            log: LogSink::new(format!("{} {}", id, target)),
            target,
            events: ctx.events.clone(),
        }
    }
}

impl ProgressSink for ChannelSink {
    fn on_progress(&self, update: &ProgressUpdate) {
        self.log.on_progress(update);
        let _ = self.events.send(Event::Progress {
            id: self.id,
            update: *update,
        });
    }

    fn on_terminal(&self, status: TransferStatus, error: Option<&str>) {
        self.log.on_terminal(status, error);
        let _ = self.events.send(Event::Finished {
            id: self.id,
            operation: self.operation,
            target: self.target.clone(),
            status,
            error: error.map(str::to_string),
        });
    }
}
