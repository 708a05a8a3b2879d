//! The repository issues are created in.
//!
//! [`Destination`] is the seam between the replay engine and the network:
//! [`GitHubDestination`] talks to the GitHub REST API, [`DryRunDestination`]
//! swallows every mutation, and tests plug in in-memory fakes.

mod dry_run;
mod error;
mod github;

pub use dry_run::DryRunDestination;
pub use error::DestinationError;
pub use github::GitHubDestination;

use crate::payload::CreationPayload;
use crate::records::{Label, Milestone};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

/// Status of an issue import as reported by the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatus {
    /// Still being processed.
    Pending,

    /// Created successfully.
    Imported,

    /// Any other status; carries the raw value.
    Failed(String),
}

impl ImportStatus {
    /// Classifies a raw status string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "imported" => Self::Imported,
            other => Self::Failed(other.to_string()),
        }
    }

    /// Returns the raw status string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Imported => "imported",
            Self::Failed(raw) => raw,
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the structured error list attached to a failed import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImportErrorDetail {
    pub location: Option<String>,
    pub resource: Option<String>,
    pub field: Option<String>,
    pub value: Option<String>,
    pub code: Option<String>,
}

impl fmt::Display for ImportErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{}.{} [{}]: {} (at {})",
            part(&self.resource),
            part(&self.field),
            part(&self.code),
            part(&self.value),
            part(&self.location)
        )
    }
}

/// Answer to an import submission or status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReceipt {
    /// Opaque reference used to poll the import again.
    pub location: String,

    /// Current status.
    pub status: ImportStatus,

    /// Structured errors, present when the import failed.
    pub errors: Vec<ImportErrorDetail>,
}

/// Write-side operations on the destination repository.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Creates a label.
    async fn create_label(&self, label: &Label) -> Result<(), DestinationError>;

    /// Creates a milestone.
    async fn create_milestone(&self, milestone: &Milestone) -> Result<(), DestinationError>;

    /// Submits an issue with its comments to the import endpoint.
    async fn start_import(&self, payload: &CreationPayload)
        -> Result<ImportReceipt, DestinationError>;

    /// Polls a previously submitted import.
    async fn import_status(&self, location: &str) -> Result<ImportReceipt, DestinationError>;

    /// Creates an issue directly, returning its number.
    async fn create_issue(&self, payload: &CreationPayload) -> Result<u64, DestinationError>;

    /// Adds a comment to an issue.
    async fn create_comment(&self, number: u64, body: &str) -> Result<(), DestinationError>;

    /// Closes an issue.
    async fn close_issue(&self, number: u64) -> Result<(), DestinationError>;

    /// Returns whether a user with this login exists.
    async fn user_exists(&self, login: &str) -> Result<bool, DestinationError>;
}
