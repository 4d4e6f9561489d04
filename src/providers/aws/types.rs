use crate::config::AppConfig;
use crate::providers::s3_client::{create_s3_client, S3Result};
use aws_sdk_s3::Client;

pub type AwsResult<T> = S3Result<T>;

/// Object store backed by the AWS S3 SDK.
///
/// Works against AWS itself or any S3-compatible endpoint configured in
/// [`AppConfig`].
#[derive(Debug, Clone)]
pub struct AwsStore {
    pub(super) client: Client,
}

impl AwsStore {
    pub fn new(config: &AppConfig) -> AwsResult<Self> {
        let client = create_s3_client(config)?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}
