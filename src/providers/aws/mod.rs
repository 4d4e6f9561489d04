mod list;
mod objects;
mod types;

pub use types::{AwsResult, AwsStore};

use super::{Bucket, ObjectDownload, ObjectEntry, ObjectStore, StoreResult};
use async_trait::async_trait;
use tokio::fs::File;

#[async_trait]
impl ObjectStore for AwsStore {
    async fn list_buckets(&self) -> StoreResult<Vec<Bucket>> {
        list::list_buckets(self).await
    }

    async fn list_objects(&self, bucket: &str) -> StoreResult<Vec<ObjectEntry>> {
        list::list_objects(self, bucket).await
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectDownload> {
        objects::get_object(self, bucket, key).await
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        file: File,
        size: u64,
    ) -> StoreResult<()> {
        objects::put_object(self, bucket, key, file, size).await
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        objects::delete_object(self, bucket, key).await
    }
}
