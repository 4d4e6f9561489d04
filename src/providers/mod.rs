//! Object store clients

pub mod aws;
#[cfg(test)]
pub(crate) mod memory;
mod s3_client;
mod store;

pub use s3_client::S3Result;
pub use store::{Bucket, ObjectBody, ObjectDownload, ObjectEntry, ObjectStore, StoreResult};
