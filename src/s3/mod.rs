//! S3 presigning module
//!
//! Issues SigV4 presigned PUT URLs through the AWS SDK. Presigning is a local
//! computation over the held credentials; no request reaches S3 until the
//! uploader uses the URL.
//!
//! # Example
//!
//! ```no_run
//! use upload_url_issuer::config::{Config, UPLOAD_URL_TTL};
//! use upload_url_issuer::s3::{S3Presigner, UrlSigner};
//! use std::time::SystemTime;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new("my-bucket");
//! let presigner = S3Presigner::from_config(&config).await;
//!
//! let upload = presigner
//!     .presign_put("my-bucket", "photos/cat.jpg", SystemTime::now(), UPLOAD_URL_TTL)
//!     .await?;
//! println!("PUT {} (expires {})", upload.url, upload.expires_at);
//! # Ok(())
//! # }
//! ```
//!
//! # Tracing
//!
//! | Operation | Span Name | Attributes |
//! |-----------|-----------|------------|
//! | PutObject presign | `s3.presign_put_object` | bucket, key, method, expires_in_secs |

mod client;

pub use client::build_client;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use std::time::{Duration, SystemTime};
use thiserror::Error;

use crate::config::Config;

/// Presigning errors
#[derive(Error, Debug)]
pub enum SignError {
    #[error("Invalid presigning configuration: {0}")]
    InvalidPresigningConfig(String),

    #[error("{0}")]
    Sdk(String),
}

/// A presigned upload authorization
#[derive(Debug, Clone, PartialEq)]
pub struct PresignedUpload {
    /// Fully qualified URL carrying signature, date, expiry, bucket, and key
    pub url: String,
    /// Point in time after which S3 rejects the URL
    pub expires_at: DateTime<Utc>,
}

/// Produces presigned upload URLs
///
/// Implemented by [`S3Presigner`]; tests substitute their own signer.
#[async_trait]
pub trait UrlSigner: Send + Sync {
    /// Presign a single PUT of `key` into `bucket`, valid for `expires_in`
    /// starting at `issued_at`
    async fn presign_put(
        &self,
        bucket: &str,
        key: &str,
        issued_at: SystemTime,
        expires_in: Duration,
    ) -> Result<PresignedUpload, SignError>;
}

/// AWS SDK backed signer
///
/// Wraps one `aws_sdk_s3::Client`, built once and reused for every request.
#[derive(Debug, Clone)]
pub struct S3Presigner {
    client: Client,
}

impl S3Presigner {
    /// Build a presigner from configuration using the SDK default chain
    pub async fn from_config(config: &Config) -> Self {
        Self {
            client: build_client(&config.s3).await,
        }
    }

    /// Wrap an already configured client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UrlSigner for S3Presigner {
    #[tracing::instrument(
        name = "s3.presign_put_object",
        skip(self, issued_at),
        fields(
            s3.bucket = %bucket,
            s3.key = %key,
            http.method = "PUT",
            expires_in_secs = expires_in.as_secs()
        ),
        err
    )]
    async fn presign_put(
        &self,
        bucket: &str,
        key: &str,
        issued_at: SystemTime,
        expires_in: Duration,
    ) -> Result<PresignedUpload, SignError> {
        let presigning = PresigningConfig::builder()
            .start_time(issued_at)
            .expires_in(expires_in)
            .build()
            .map_err(|e| SignError::InvalidPresigningConfig(e.to_string()))?;

        let request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| SignError::Sdk(DisplayErrorContext(&e).to_string()))?;

        Ok(PresignedUpload {
            url: request.uri().to_string(),
            expires_at: DateTime::<Utc>::from(issued_at + expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
    use std::time::UNIX_EPOCH;

    fn client_with_region(region: Option<&str>) -> Client {
        let credentials = Credentials::new("AKIDEXAMPLE", "secret", None, None, "static");
        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials);
        if let Some(region) = region {
            builder = builder.region(Region::new(region.to_string()));
        }
        Client::from_conf(builder.build())
    }

    fn issued_at() -> SystemTime {
        // 2024-01-01T00:00:00Z
        UNIX_EPOCH + Duration::from_secs(1_704_067_200)
    }

    #[tokio::test]
    async fn test_presign_put_addresses_bucket_and_key() {
        let presigner = S3Presigner::from_client(client_with_region(Some("us-east-1")));

        let upload = presigner
            .presign_put("test-bucket", "report.csv", issued_at(), Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(upload.url.starts_with("https://"));
        assert!(upload.url.contains("test-bucket"));
        assert!(upload.url.contains("/report.csv?"));
        assert!(upload.url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn test_presign_put_expiry() {
        let presigner = S3Presigner::from_client(client_with_region(Some("us-east-1")));

        let upload = presigner
            .presign_put("test-bucket", "report.csv", issued_at(), Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(upload.url.contains("X-Amz-Date=20240101T000000Z"));
        assert!(upload.url.contains("X-Amz-Expires=3600"));
        assert_eq!(upload.expires_at.to_rfc3339(), "2024-01-01T01:00:00+00:00");
    }

    #[tokio::test]
    async fn test_presign_put_rejects_expiry_over_one_week() {
        let presigner = S3Presigner::from_client(client_with_region(Some("us-east-1")));

        let result = presigner
            .presign_put(
                "test-bucket",
                "report.csv",
                issued_at(),
                Duration::from_secs(8 * 24 * 3600),
            )
            .await;

        assert!(matches!(result, Err(SignError::InvalidPresigningConfig(_))));
    }

    #[tokio::test]
    async fn test_presign_put_without_region_fails() {
        let presigner = S3Presigner::from_client(client_with_region(None));

        let result = presigner
            .presign_put("test-bucket", "report.csv", issued_at(), Duration::from_secs(3600))
            .await;

        assert!(matches!(result, Err(SignError::Sdk(ref msg)) if !msg.is_empty()));
    }
}
