//! Object transfers between the store and local files
//!
//! - Downloads stream in fixed-size chunks with a progress update per chunk
//! - Uploads are a single store write with start/finish progress
//! - Deletes pass the store's outcome straight through

mod engine;
mod error;
mod sink;
mod types;

pub use engine::TransferEngine;
pub use error::TransferError;
pub use sink::{LogSink, ProgressSink};
pub use types::{
    Direction, Location, Operation, ProgressUpdate, TransferProgress, TransferRequest,
    TransferStatus, DEFAULT_CHUNK_SIZE,
};
