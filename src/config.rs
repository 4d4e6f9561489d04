//! Application configuration loaded from a `.env` file or the process environment

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default location of the env file, relative to the working directory
pub const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error loading config file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
    #[error("error loading config environment: {0}")]
    Env(#[from] envy::Error),
    #[error("required config field {0} is empty")]
    Empty(&'static str),
}

/// Connection settings for the object store.
///
/// Built once at startup and handed to the store constructor.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "aws_access_key_id")]
    pub access_key: String,
    #[serde(rename = "aws_secret_access_key")]
    pub secret_key: String,
    #[serde(rename = "aws_default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO, R2, ...)
    #[serde(rename = "aws_endpoint_url", default)]
    pub endpoint_url: Option<String>,
    #[serde(rename = "s3_force_path_style", default)]
    pub force_path_style: bool,
}

impl AppConfig {
    /// Load the config. When `env_file` exists its variables are added to the
    /// process environment first; variables already set take precedence.
    pub fn load(env_file: &Path) -> Result<Self, ConfigError> {
        if env_file.exists() {
            dotenvy::from_path(env_file).map_err(|source| ConfigError::EnvFile {
                path: env_file.to_path_buf(),
                source,
            })?;
            log::info!("Loaded config file {}", env_file.display());
        }
        let config: AppConfig = envy::from_env()?;
        config.validate()
    }

    /// Build the config from explicit `(NAME, value)` pairs
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: AppConfig = envy::from_iter(vars)?;
        config.validate()
    }

    fn validate(mut self) -> Result<Self, ConfigError> {
        if self.access_key.trim().is_empty() {
            return Err(ConfigError::Empty("AWS_ACCESS_KEY_ID"));
        }
        if self.secret_key.trim().is_empty() {
            return Err(ConfigError::Empty("AWS_SECRET_ACCESS_KEY"));
        }
        if self.region.trim().is_empty() {
            return Err(ConfigError::Empty("AWS_DEFAULT_REGION"));
        }
        // An empty endpoint means "use the default AWS endpoint"
        if self
            .endpoint_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            self.endpoint_url = None;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn loads_required_fields() {
        let config = AppConfig::from_vars(vars(&[
            ("AWS_ACCESS_KEY_ID", "AKIA"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_DEFAULT_REGION", "eu-west-1"),
        ]))
        .unwrap();

        assert_eq!(config.access_key, "AKIA");
        assert_eq!(config.secret_key, "secret");
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.endpoint_url, None);
        assert!(!config.force_path_style);
    }

    #[test]
    fn loads_optional_endpoint_settings() {
        let config = AppConfig::from_vars(vars(&[
            ("AWS_ACCESS_KEY_ID", "minio"),
            ("AWS_SECRET_ACCESS_KEY", "minio123"),
            ("AWS_DEFAULT_REGION", "us-east-1"),
            ("AWS_ENDPOINT_URL", "http://localhost:9000"),
            ("S3_FORCE_PATH_STYLE", "true"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:9000"));
        assert!(config.force_path_style);
    }

    #[test]
    fn missing_region_is_an_error() {
        let err = AppConfig::from_vars(vars(&[
            ("AWS_ACCESS_KEY_ID", "AKIA"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::Env(_)));
        assert!(err.to_string().contains("aws_default_region"));
    }

    #[test]
    fn empty_secret_is_an_error() {
        let err = AppConfig::from_vars(vars(&[
            ("AWS_ACCESS_KEY_ID", "AKIA"),
            ("AWS_SECRET_ACCESS_KEY", "  "),
            ("AWS_DEFAULT_REGION", "eu-west-1"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::Empty("AWS_SECRET_ACCESS_KEY")));
    }

    #[test]
    fn blank_endpoint_falls_back_to_default() {
        let config = AppConfig::from_vars(vars(&[
            ("AWS_ACCESS_KEY_ID", "AKIA"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_DEFAULT_REGION", "eu-west-1"),
            ("AWS_ENDPOINT_URL", ""),
        ]))
        .unwrap();

        assert_eq!(config.endpoint_url, None);
    }
}
