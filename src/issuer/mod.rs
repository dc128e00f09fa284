//! Upload URL issuer
//!
//! Turns a requested object key into an API Gateway style response carrying
//! a presigned PUT URL. The key is used verbatim: no validation, no
//! normalization, `/` addresses nested keys.
//!
//! # Responses
//!
//! | Outcome | `statusCode` | `body` |
//! |---------|--------------|--------|
//! | Signed | 200 | `{"url": "<presigned url>"}` |
//! | Signing failed | 500 | `"<error message>"` |

use crate::config::{Config, UPLOAD_URL_TTL};
use crate::s3::UrlSigner;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Issuer response in API Gateway proxy shape
///
/// `body` is already JSON-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub status_code: u16,
    pub body: String,
}

impl IssueResponse {
    fn ok(url: String) -> Self {
        Self {
            status_code: 200,
            body: serde_json::json!({ "url": url }).to_string(),
        }
    }

    fn signing_failed(message: String) -> Self {
        Self {
            status_code: 500,
            body: serde_json::Value::String(message).to_string(),
        }
    }

    /// Whether the URL was issued
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Body of a successful response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedUrlBody {
    pub url: String,
}

/// Issues presigned upload URLs for the configured bucket
pub struct UrlIssuer<S> {
    signer: S,
    config: Config,
}

impl<S: UrlSigner> UrlIssuer<S> {
    /// Create a new issuer
    pub fn new(signer: S, config: Config) -> Self {
        Self { signer, config }
    }

    /// Get the bucket name URLs are issued for
    pub fn bucket_name(&self) -> &str {
        &self.config.bucket_name
    }

    /// Issue a URL valid from now for [`UPLOAD_URL_TTL`]
    pub async fn issue(&self, file_name: &str) -> IssueResponse {
        self.issue_at(file_name, SystemTime::now()).await
    }

    /// Issue a URL valid from `issued_at` for [`UPLOAD_URL_TTL`]
    ///
    /// Single attempt. A signing failure becomes a 500 whose body is the
    /// error text.
    #[tracing::instrument(
        name = "issuer.issue",
        skip(self, issued_at),
        fields(
            s3.bucket = %self.config.bucket_name,
            s3.key = %file_name,
            http.status_code = tracing::field::Empty
        )
    )]
    pub async fn issue_at(&self, file_name: &str, issued_at: SystemTime) -> IssueResponse {
        let result = self
            .signer
            .presign_put(&self.config.bucket_name, file_name, issued_at, UPLOAD_URL_TTL)
            .await;

        let response = match result {
            Ok(upload) => {
                tracing::info!(
                    expires_at = %upload.expires_at.to_rfc3339(),
                    "Issued presigned upload URL"
                );
                IssueResponse::ok(upload.url)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to presign upload URL");
                IssueResponse::signing_failed(e.to_string())
            }
        };

        tracing::Span::current().record("http.status_code", response.status_code);
        response
    }
}
