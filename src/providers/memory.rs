//! In-memory object store used by the engine and browser tests

use super::{Bucket, ObjectDownload, ObjectEntry, ObjectStore, StoreResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

/// What `get_object` reports as the content length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeHint {
    #[default]
    Exact,
    Unknown,
    Zero,
    Fixed(u64),
}

#[derive(Default)]
struct Inner {
    buckets: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    size_hint: SizeHint,
    fail_read_after: Option<usize>,
    max_read: Option<usize>,
    fail_put: bool,
    fail_list: bool,
    puts: Vec<(String, String, usize)>,
    deletes: Vec<(String, String)>,
}

#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    open_bodies: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(self, bucket: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .buckets
            .entry(bucket.to_string())
            .or_default();
        self
    }

    pub fn with_object(self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) -> Self {
        self.insert(bucket, key, data);
        self
    }

    pub fn insert(&self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) {
        self.inner
            .lock()
            .unwrap()
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), data.into());
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.inner
            .lock()
            .unwrap()
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key).cloned())
    }

    pub fn set_size_hint(&self, hint: SizeHint) {
        self.inner.lock().unwrap().size_hint = hint;
    }

    /// Make object bodies fail once `bytes` have been read
    pub fn fail_reads_after(&self, bytes: usize) {
        self.inner.lock().unwrap().fail_read_after = Some(bytes);
    }

    /// Cap the bytes returned by a single read, like a slow network stream
    pub fn limit_read_size(&self, bytes: usize) {
        self.inner.lock().unwrap().max_read = Some(bytes);
    }

    pub fn fail_puts(&self) {
        self.inner.lock().unwrap().fail_put = true;
    }

    pub fn fail_listings(&self) {
        self.inner.lock().unwrap().fail_list = true;
    }

    pub fn puts(&self) -> Vec<(String, String, usize)> {
        self.inner.lock().unwrap().puts.clone()
    }

    pub fn deletes(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().deletes.clone()
    }

    /// Object bodies handed out and not yet dropped
    pub fn open_bodies(&self) -> usize {
        self.open_bodies.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_buckets(&self) -> StoreResult<Vec<Bucket>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .buckets
            .keys()
            .map(|name| Bucket {
                name: name.clone(),
                creation_date: None,
            })
            .collect())
    }

    async fn list_objects(&self, bucket: &str) -> StoreResult<Vec<ObjectEntry>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_list {
            return Err(format!("AccessDenied: list of {} not allowed", bucket).into());
        }
        let objects = inner
            .buckets
            .get(bucket)
            .ok_or_else(|| format!("NoSuchBucket: {}", bucket))?;
        Ok(objects
            .iter()
            .map(|(key, data)| ObjectEntry::object(key.clone(), Some(data.len() as u64)))
            .collect())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectDownload> {
        let inner = self.inner.lock().unwrap();
        let data = inner
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .cloned()
            .ok_or_else(|| format!("NoSuchKey: {}/{}", bucket, key))?;

        let content_length = match inner.size_hint {
            SizeHint::Exact => Some(data.len() as u64),
            SizeHint::Unknown => None,
            SizeHint::Zero => Some(0),
            SizeHint::Fixed(n) => Some(n),
        };

        self.open_bodies.fetch_add(1, Ordering::SeqCst);
        Ok(ObjectDownload {
            body: Box::pin(TrackedBody {
                data,
                pos: 0,
                fail_after: inner.fail_read_after,
                max_read: inner.max_read,
                open: self.open_bodies.clone(),
            }),
            content_length,
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        mut file: File,
        size: u64,
    ) -> StoreResult<()> {
        let fail_put = self.inner.lock().unwrap().fail_put;
        if fail_put {
            return Err("ServiceUnavailable: put rejected".into());
        }

        let mut data = Vec::with_capacity(size as usize);
        file.read_to_end(&mut data).await?;

        let mut inner = self.inner.lock().unwrap();
        let objects = inner
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| format!("NoSuchBucket: {}", bucket))?;
        let len = data.len();
        objects.insert(key.to_string(), data);
        inner.puts.push((bucket.to_string(), key.to_string(), len));
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let objects = inner
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| format!("NoSuchBucket: {}", bucket))?;
        // S3 reports success for absent keys
        objects.remove(key);
        inner.deletes.push((bucket.to_string(), key.to_string()));
        Ok(())
    }
}

struct TrackedBody {
    data: Vec<u8>,
    pos: usize,
    fail_after: Option<usize>,
    max_read: Option<usize>,
    open: Arc<AtomicUsize>,
}

impl AsyncRead for TrackedBody {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        let mut available = this.data.len() - this.pos;
        if let Some(limit) = this.fail_after {
            if this.pos >= limit {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset by store",
                )));
            }
            available = available.min(limit - this.pos);
        }
        if let Some(max) = this.max_read {
            available = available.min(max);
        }
        let n = available.min(buf.remaining());
        buf.put_slice(&this.data[this.pos..this.pos + n]);
        this.pos += n;
        Poll::Ready(Ok(()))
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}
