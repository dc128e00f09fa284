//! Configuration module for the upload URL issuer
//!
//! The deployed function is configured entirely through the process
//! environment. Local runs may instead point at a YAML file, which supports
//! environment variable expansion in the same way.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Validity window of every issued upload URL.
pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(3600);

/// Environment variable holding the target bucket name
pub const BUCKET_NAME_VAR: &str = "BUCKET_NAME";

/// Environment variable overriding the SDK region
pub const REGION_VAR: &str = "AWS_REGION";

/// Environment variable pointing at an S3-compatible endpoint
pub const ENDPOINT_VAR: &str = "S3_ENDPOINT_URL";

/// Environment variable enabling path-style addressing
pub const FORCE_PATH_STYLE_VAR: &str = "S3_FORCE_PATH_STYLE";

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in a string.
///
/// Supports two syntaxes:
/// - `${VAR_NAME}` - Simple expansion, keeps placeholder if var not found
/// - `${VAR_NAME:-default}` - Expansion with default value
///
/// # Examples
///
/// ```ignore
/// std::env::set_var("MY_VAR", "value");
/// let result = expand_env_vars("prefix-${MY_VAR}-suffix", |k| std::env::var(k).ok());
/// assert_eq!(result, "prefix-value-suffix");
/// ```
pub(crate) fn expand_env_vars<F>(s: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}") {
        Ok(re) => re,
        Err(_) => return s.to_string(),
    };
    let mut last_match = 0;
    let mut result = String::with_capacity(s.len());

    for cap in re.captures_iter(s) {
        let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };

        result.push_str(&s[last_match..full_match.start()]);

        let value = match lookup(var_name.as_str()) {
            Some(val) => val,
            None => match cap.get(2) {
                Some(default) => default.as_str().to_string(),
                // No env var and no default. Keep the original placeholder.
                None => full_match.as_str().to_string(),
            },
        };
        result.push_str(&value);

        last_match = full_match.end();
    }

    result.push_str(&s[last_match..]);

    result
}

/// Parse a boolean flag the way operators usually write them in env files.
pub(crate) fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::ValidationError(format!(
            "{} must be a boolean, got '{}'",
            name, other
        ))),
    }
}

/// Validate that a URL starts with http:// or https://
fn is_valid_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration structure
///
/// Populated once at startup and handed to the issuer; nothing reads the
/// environment after that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Bucket every upload URL is issued for
    pub bucket_name: String,
    #[serde(default)]
    pub s3: S3Config,
}

impl Config {
    /// Create a configuration for `bucket_name` with SDK defaults
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            s3: S3Config::default(),
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        ConfigLoader::from_env()
    }

    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        ConfigLoader::load(path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "bucket_name cannot be empty".into(),
            ));
        }

        if let Some(ref endpoint) = self.s3.endpoint {
            if !is_valid_http_url(endpoint) {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid S3 endpoint '{}': must start with http:// or https://",
                    endpoint
                )));
            }
        }

        if let Some(ref region) = self.s3.region {
            if region.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "region cannot be empty when set".into(),
                ));
            }
        }

        Ok(())
    }
}

/// S3 client overrides
///
/// Every field is optional; unset values fall back to the AWS SDK default
/// provider chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct S3Config {
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible stores (MinIO, LocalStack)
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
}
