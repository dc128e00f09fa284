//! Lambda server module
//!
//! Receives API Gateway / ALB events through `lambda_http`, extracts the
//! requested file name, and hands it to the [`UrlIssuer`].

use crate::config::Config;
use crate::issuer::{IssueResponse, UrlIssuer};
use crate::s3::{S3Presigner, UrlSigner};
use lambda_http::http::header::CONTENT_TYPE;
use lambda_http::{service_fn, Body, Error, Request, RequestExt, Response};
use thiserror::Error;
use tracing::info;

/// Query parameter naming the object key
pub const FILE_NAME_PARAM: &str = "file_name";

/// Request errors
///
/// These are not turned into responses. They fail the invocation and the
/// Lambda runtime reports them as a function error.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Missing query string parameter: {name}")]
    MissingFileName { name: &'static str },

    #[error("Empty query string parameter: {name}")]
    EmptyFileName { name: &'static str },
}

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Lambda runtime error: {0}")]
    RuntimeError(String),
}

/// Handle one invocation
pub async fn handle<S: UrlSigner>(
    issuer: &UrlIssuer<S>,
    event: Request,
) -> Result<Response<Body>, Error> {
    let file_name = file_name(&event)?;
    let response = issuer.issue(&file_name).await;
    into_http_response(response)
}

/// Extract the `file_name` query parameter, first value wins
///
/// S3 keys are at least one character, so an empty value fails the
/// invocation like a missing one and never reaches the signer.
fn file_name(event: &Request) -> Result<String, RequestError> {
    let value = event
        .query_string_parameters_ref()
        .and_then(|params| params.first(FILE_NAME_PARAM))
        .ok_or(RequestError::MissingFileName {
            name: FILE_NAME_PARAM,
        })?;

    if value.is_empty() {
        return Err(RequestError::EmptyFileName {
            name: FILE_NAME_PARAM,
        });
    }

    Ok(value.to_string())
}

fn into_http_response(response: IssueResponse) -> Result<Response<Body>, Error> {
    let resp = Response::builder()
        .status(response.status_code)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(response.body))
        .map_err(Box::new)?;

    Ok(resp)
}

/// Lambda server
pub struct Server {
    issuer: UrlIssuer<S3Presigner>,
}

impl Server {
    /// Create a new server instance
    ///
    /// Builds the S3 client once; every invocation reuses it.
    pub async fn new(config: Config) -> Self {
        let presigner = S3Presigner::from_config(&config).await;
        Self::with_issuer(UrlIssuer::new(presigner, config))
    }

    /// Create a server around an existing issuer
    pub fn with_issuer(issuer: UrlIssuer<S3Presigner>) -> Self {
        Self { issuer }
    }

    /// Run the Lambda runtime loop until the runtime shuts down
    pub async fn run(&self) -> Result<(), ServerError> {
        info!(bucket = %self.issuer.bucket_name(), "Starting upload URL issuer");

        let issuer = &self.issuer;
        lambda_http::run(service_fn(move |event: Request| async move {
            handle(issuer, event).await
        }))
        .await
        .map_err(|e| ServerError::RuntimeError(e.to_string()))?;

        info!("Shutting down upload URL issuer");
        Ok(())
    }
}
