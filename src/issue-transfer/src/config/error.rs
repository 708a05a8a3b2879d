//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading run configuration.
///
/// All of these are raised before any request reaches the destination.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("Failed to parse replacement rules in '{path}': {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Failed to parse YAML content.
    #[error("Failed to parse replacement rules in '{path}': {source}")]
    YamlError {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Validation error in a rule file.
    #[error("Validation error in '{path}': {message}")]
    ValidationError { path: String, message: String },

    /// Repository identifier is not in `owner/name` form.
    #[error("Invalid repository '{value}', expected owner/name")]
    InvalidRepository { value: String },

    /// API endpoint is not a valid URL.
    #[error("Invalid endpoint '{value}': {source}")]
    InvalidEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// Fire-and-forget imports cannot keep numbers aligned across gaps.
    #[error(
        "Fire-and-forget imports cannot fill {placeholders} numbering gap(s); use synchronous mode"
    )]
    UnsafeFireAndForget { placeholders: u64 },
}
