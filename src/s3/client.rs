//! SDK client construction
//!
//! One `aws_sdk_s3::Client` is created per process from [`S3Config`] on top of
//! the AWS default provider chain (environment, profile, container and
//! instance credentials; `AWS_REGION`).

use crate::config::S3Config;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client;

/// Build an S3 client, applying the configured overrides
pub async fn build_client(config: &S3Config) -> Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(ref region) = config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    let shared = loader.load().await;

    Client::from_conf(client_config(&shared, config))
}

fn client_config(shared: &aws_config::SdkConfig, config: &S3Config) -> aws_sdk_s3::Config {
    let mut builder = aws_sdk_s3::config::Builder::from(shared);
    if let Some(ref endpoint) = config.endpoint {
        tracing::debug!(endpoint = %endpoint, "Using custom S3 endpoint");
        builder = builder.endpoint_url(endpoint);
    }
    builder.force_path_style(config.force_path_style).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::Credentials;
    use aws_sdk_s3::presigning::PresigningConfig;
    use std::time::Duration;

    fn shared_config() -> aws_config::SdkConfig {
        aws_config::SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build()
    }

    async fn presigned_uri(s3: aws_sdk_s3::Config) -> String {
        let s3 = s3
            .to_builder()
            .credentials_provider(Credentials::new("AKIDEXAMPLE", "secret", None, None, "test"))
            .build();
        Client::from_conf(s3)
            .put_object()
            .bucket("uploads")
            .key("a/b.txt")
            .presigned(PresigningConfig::expires_in(Duration::from_secs(60)).unwrap())
            .await
            .unwrap()
            .uri()
            .to_string()
    }

    #[test]
    fn test_client_config_inherits_region() {
        let s3 = client_config(&shared_config(), &S3Config::default());
        assert_eq!(s3.region().map(|r| r.as_ref()), Some("us-east-1"));
    }

    #[tokio::test]
    async fn test_client_config_default_endpoint() {
        let s3 = client_config(&shared_config(), &S3Config::default());
        let uri = presigned_uri(s3).await;
        assert!(uri.starts_with("https://uploads.s3.us-east-1.amazonaws.com/a/b.txt?"));
    }

    #[tokio::test]
    async fn test_client_config_custom_endpoint_path_style() {
        let overrides = S3Config {
            region: None,
            endpoint: Some("http://localhost:9000".into()),
            force_path_style: true,
        };
        let s3 = client_config(&shared_config(), &overrides);
        let uri = presigned_uri(s3).await;
        assert!(uri.starts_with("http://localhost:9000/uploads/a/b.txt?"));
    }
}
