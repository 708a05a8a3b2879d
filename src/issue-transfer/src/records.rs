//! Source-side data read from the origin repository.
//!
//! Issues and pull requests share the [`Record`] representation so the
//! sequencer and the request builder can treat them uniformly.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Title prefix marking records that were pull requests at the origin.
pub const PULL_REQUEST_TITLE_PREFIX: &str = "[PR] ";

/// Where a [`Record`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// A regular issue.
    Issue,
    /// A pull request.
    PullRequest,
}

impl RecordKind {
    /// Returns the kind as a string for logging.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::PullRequest => "pull_request",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user who wrote an issue or comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    /// Login name at the origin.
    pub login: String,

    /// URL of the user's avatar image.
    pub avatar_url: String,
}

impl Author {
    /// Placeholder author used when the origin user was deleted.
    #[must_use]
    pub fn ghost() -> Self {
        Self {
            login: "ghost".to_string(),
            avatar_url: String::new(),
        }
    }
}

/// A comment attached to a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// Comment author.
    pub author: Author,

    /// Raw comment body.
    pub body: String,

    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
}

/// An issue or pull request read from the origin repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Whether this was an issue or a pull request.
    pub kind: RecordKind,

    /// Number at the origin. Positive and unique within its kind.
    pub number: u64,

    /// Title. Pull requests already carry [`PULL_REQUEST_TITLE_PREFIX`].
    pub title: String,

    /// Raw body text.
    pub body: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,

    /// Whether the record is closed (or merged) at the origin.
    pub closed: bool,

    /// Label names.
    pub labels: Vec<String>,

    /// Milestone number, if any.
    pub milestone_number: Option<u64>,

    /// First assignee login. Only one assignee is carried over.
    pub assignee_login: Option<String>,

    /// Original author.
    pub author: Author,

    /// Comments in posting order.
    pub comments: Vec<Comment>,
}

/// A label read from the origin repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub name: String,
    /// Hex color without the leading `#`.
    pub color: String,
    pub description: String,
}

/// A milestone read from the origin repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
    /// Origin state, e.g. `OPEN` or `CLOSED`.
    pub state: String,
    pub due_on: Option<DateTime<Utc>>,
    pub description: String,
}

impl Milestone {
    /// Returns the state in the lower-case form the REST API expects.
    #[must_use]
    pub fn rest_state(&self) -> String {
        self.state.to_lowercase()
    }
}
