//! Upload URL Issuer Library
//!
//! Serverless function that issues time-limited presigned S3 upload URLs.
//!
//! # Features
//!
//! - **Upload Only**: Issues PUT authorizations, never reads objects
//! - **Local Signing**: URLs are signed with held credentials, no S3 round trip
//! - **Fixed Window**: Every URL expires one hour after issuance
//! - **S3 Compatible**: Custom endpoints and path-style addressing
//!
//! # Example
//!
//! ```no_run
//! use upload_url_issuer::{config::Config, server::Server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = Server::new(config).await;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod issuer;
pub mod s3;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use issuer::{IssueResponse, UrlIssuer};
pub use server::Server;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
