//! The repository records are read from.

mod error;
mod github;

pub use error::SourceError;
pub use github::GitHubSource;

use crate::records::{Label, Milestone, Record};
use async_trait::async_trait;

/// Read-side access to the origin repository.
///
/// Every collection is returned complete and in creation order; paging is
/// the implementation's business.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// All labels.
    async fn labels(&self) -> Result<Vec<Label>, SourceError>;

    /// All milestones.
    async fn milestones(&self) -> Result<Vec<Milestone>, SourceError>;

    /// All issues.
    async fn issues(&self) -> Result<Vec<Record>, SourceError>;

    /// All pull requests, titles already prefixed.
    async fn pull_requests(&self) -> Result<Vec<Record>, SourceError>;
}
