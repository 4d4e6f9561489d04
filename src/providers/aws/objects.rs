use super::types::{AwsResult, AwsStore};
use crate::providers::ObjectDownload;
use aws_sdk_s3::primitives::ByteStream;
use tokio::fs::File;

pub(super) async fn get_object(
    store: &AwsStore,
    bucket: &str,
    key: &str,
) -> AwsResult<ObjectDownload> {
    let response = store
        .client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await?;

    let content_length = response
        .content_length()
        .and_then(|len| u64::try_from(len).ok());

    Ok(ObjectDownload {
        body: Box::pin(response.body.into_async_read()),
        content_length,
    })
}

pub(super) async fn put_object(
    store: &AwsStore,
    bucket: &str,
    key: &str,
    file: File,
    size: u64,
) -> AwsResult<()> {
    let content_length = i64::try_from(size)?;
    let body = ByteStream::read_from().file(file).build().await?;

    let response = store
        .client
        .put_object()
        .bucket(bucket)
        .key(key)
        .content_length(content_length)
        .body(body)
        .send()
        .await?;

    log::debug!(
        "put_object_done: {}/{} etag={}",
        bucket,
        key,
        response.e_tag().unwrap_or_default()
    );
    Ok(())
}

pub(super) async fn delete_object(store: &AwsStore, bucket: &str, key: &str) -> AwsResult<()> {
    store
        .client
        .delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await?;
    Ok(())
}
