//! Object store capability consumed by the transfer engine and the browser

use super::s3_client::S3Result;
use async_trait::async_trait;
use serde::Serialize;
use std::pin::Pin;
use tokio::fs::File;
use tokio::io::AsyncRead;

pub type StoreResult<T> = S3Result<T>;

/// Byte stream of an object's content
pub type ObjectBody = Pin<Box<dyn AsyncRead + Send>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub name: String,
    pub creation_date: Option<String>,
}

/// One entry of a single-page bucket listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectEntry {
    pub key: String,
    /// True for `/`-terminated keys, which stand for virtual folders
    pub is_prefix: bool,
    pub size: Option<u64>,
}

impl ObjectEntry {
    pub fn object(key: impl Into<String>, size: Option<u64>) -> Self {
        let key = key.into();
        let is_prefix = key.ends_with('/');
        Self {
            key,
            is_prefix,
            size,
        }
    }
}

/// Read side of a get-object call
pub struct ObjectDownload {
    pub body: ObjectBody,
    /// Size hint reported by the store, if any
    pub content_length: Option<u64>,
}

impl std::fmt::Debug for ObjectDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectDownload")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// S3-compatible object store.
///
/// Implementations must be safe to call concurrently from independent tasks.
/// Listings return the first page only.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_buckets(&self) -> StoreResult<Vec<Bucket>>;

    async fn list_objects(&self, bucket: &str) -> StoreResult<Vec<ObjectEntry>>;

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectDownload>;

    /// Write `file` (of `size` bytes) as the full body of `bucket/key`.
    /// The file is consumed and closed by the time this returns.
    async fn put_object(&self, bucket: &str, key: &str, file: File, size: u64)
        -> StoreResult<()>;

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()>;
}
