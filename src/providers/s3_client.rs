use crate::config::AppConfig;
use aws_config::Region;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::Client;

pub type S3Result<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub fn create_s3_client(config: &AppConfig) -> S3Result<Client> {
    // Static, non-temporary credentials: no session token
    let credentials = Credentials::new(
        &config.access_key,
        &config.secret_key,
        None,
        None,
        "s3explorer",
    );

    let mut builder = S3ConfigBuilder::new()
        .credentials_provider(credentials)
        .region(Region::new(config.region.clone()));

    if let Some(endpoint_url) = config.endpoint_url.as_deref() {
        builder = builder.endpoint_url(endpoint_url);
    }

    if config.force_path_style {
        builder = builder.force_path_style(true);
    }

    let s3_config = builder.build();
    Ok(Client::from_conf(s3_config))
}
