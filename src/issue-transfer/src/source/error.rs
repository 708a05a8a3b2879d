//! Record source error types.

use thiserror::Error;

/// Errors that can occur while reading the origin repository.
#[derive(Debug, Error)]
pub enum SourceError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// The GraphQL endpoint answered with errors.
    #[error("GraphQL query for {connection} failed: {messages}")]
    GraphQl {
        connection: &'static str,
        messages: String,
    },

    /// The repository does not exist or is not visible to the token.
    #[error("Repository {repository} not found")]
    MissingRepository { repository: String },

    /// The response did not have the expected shape.
    #[error("Unexpected {connection} response: {source}")]
    InvalidResponse {
        connection: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
