//! Run configuration inputs.
//!
//! This module handles loading replacement rule files and parsing repository
//! identifiers and endpoints. Every failure here surfaces as a
//! [`ConfigError`] before any network activity.

mod error;
mod replacement;
mod repository;

pub use error::ConfigError;
pub use replacement::{ReplacementRule, ReplacementRules};
pub use repository::RepositoryId;

use url::Url;

/// Default GitHub API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com";

/// Parses an API endpoint URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEndpoint`] if the value is not a URL.
pub fn parse_endpoint(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidEndpoint {
        value: value.to_string(),
        source: e,
    })
}
