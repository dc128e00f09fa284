//! Configuration loader for environment and YAML sources

use super::{
    expand_env_vars, parse_flag, Config, ConfigError, S3Config, BUCKET_NAME_VAR, ENDPOINT_VAR,
    FORCE_PATH_STYLE_VAR, REGION_VAR,
};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// `BUCKET_NAME` is required. Empty optional values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bucket_name =
            lookup(BUCKET_NAME_VAR).ok_or_else(|| ConfigError::MissingVar(BUCKET_NAME_VAR.into()))?;

        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let force_path_style = match optional(FORCE_PATH_STYLE_VAR) {
            Some(value) => parse_flag(FORCE_PATH_STYLE_VAR, &value)?,
            None => false,
        };

        let config = Config {
            bucket_name,
            s3: S3Config {
                region: optional(REGION_VAR),
                endpoint: optional(ENDPOINT_VAR),
                force_path_style,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, expanding `${VAR}` placeholders
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, |name| std::env::var(name).ok())
    }

    fn parse<F>(content: &str, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = expand_env_vars(content, lookup);
        let config: Config = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }
}
