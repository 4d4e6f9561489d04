use super::types::{AwsResult, AwsStore};
use crate::providers::{Bucket, ObjectEntry};

pub(super) async fn list_buckets(store: &AwsStore) -> AwsResult<Vec<Bucket>> {
    let response = store.client.list_buckets().send().await?;

    let buckets = response
        .buckets()
        .iter()
        .filter_map(|bucket| {
            let name = bucket.name()?.to_string();
            let creation_date = bucket.creation_date().map(|dt| dt.to_string());
            Some(Bucket {
                name,
                creation_date,
            })
        })
        .collect();

    Ok(buckets)
}

/// First page of a bucket listing; continuation tokens are not followed.
///
/// No delimiter is sent, so the listing is flat: folders only show up as
/// `/`-terminated marker keys.
pub(super) async fn list_objects(store: &AwsStore, bucket: &str) -> AwsResult<Vec<ObjectEntry>> {
    let response = store.client.list_objects_v2().bucket(bucket).send().await?;

    if response.is_truncated().unwrap_or(false) {
        log::warn!(
            "list_objects_truncated: bucket={} returned={}",
            bucket,
            response.key_count().unwrap_or_default()
        );
    }

    let entries = response
        .contents()
        .iter()
        .filter_map(|obj| {
            let key = obj.key()?;
            let size = obj.size().and_then(|s| u64::try_from(s).ok());
            Some(ObjectEntry::object(key, size))
        })
        .collect();

    Ok(entries)
}
