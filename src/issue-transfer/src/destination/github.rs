//! GitHub REST implementation of [`Destination`].

use super::{Destination, DestinationError, ImportErrorDetail, ImportReceipt, ImportStatus};
use crate::client::build_client;
use crate::config::RepositoryId;
use crate::payload::CreationPayload;
use crate::rate_limit::RateLimitGuard;
use crate::records::{Label, Milestone};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::models::IssueState;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Media type required by the issue import endpoints.
const IMPORT_MEDIA_TYPE: &str = "application/vnd.github.golden-comet-preview+json";

/// Check the core rate limit once every this many mutating calls.
const RATE_LIMIT_CHECK_INTERVAL: u32 = 25;

/// Destination repository on GitHub or GitHub Enterprise.
pub struct GitHubDestination {
    repository: RepositoryId,
    client: Octocrab,
    /// Same credentials, but sends the import preview media type.
    import_client: Octocrab,
    rate_limit: RateLimitGuard,
}

impl GitHubDestination {
    /// Builds clients for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be used as a base URI.
    pub fn new(
        repository: RepositoryId,
        endpoint: &Url,
        token: Option<&str>,
    ) -> Result<Self, octocrab::Error> {
        Ok(Self {
            client: build_client(endpoint, token, None)?,
            import_client: build_client(endpoint, token, Some(IMPORT_MEDIA_TYPE))?,
            repository,
            rate_limit: RateLimitGuard::new(RATE_LIMIT_CHECK_INTERVAL),
        })
    }

    fn route(&self, suffix: &str) -> String {
        format!(
            "/repos/{}/{}/{suffix}",
            self.repository.owner, self.repository.name
        )
    }

    /// Pauses for the rate limit. Enterprise hosts may have rate limiting
    /// disabled, so a failed check only gets logged.
    async fn guard(&self) {
        if let Err(e) = self.rate_limit.ensure(&self.client).await {
            warn!(error = %e, "Rate limit check failed, continuing");
        }
    }
}

#[derive(Serialize)]
struct ImportRequest<'a> {
    issue: ImportIssue<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    comments: Vec<ImportComment<'a>>,
}

#[derive(Serialize)]
struct ImportIssue<'a> {
    title: &'a str,
    body: &'a str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    closed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    milestone: Option<u64>,
    closed: bool,
    #[serde(skip_serializing_if = "no_labels")]
    labels: &'a [String],
}

fn no_labels(labels: &&[String]) -> bool {
    labels.is_empty()
}

#[derive(Serialize)]
struct ImportComment<'a> {
    created_at: DateTime<Utc>,
    body: &'a str,
}

impl<'a> From<&'a CreationPayload> for ImportRequest<'a> {
    fn from(payload: &'a CreationPayload) -> Self {
        Self {
            issue: ImportIssue {
                title: &payload.title,
                body: &payload.body,
                created_at: payload.created_at,
                updated_at: payload.updated_at,
                closed_at: payload.closed_at,
                assignee: payload.assignee.as_deref(),
                milestone: payload.milestone,
                closed: payload.closed,
                labels: &payload.labels,
            },
            comments: payload
                .comments
                .iter()
                .map(|comment| ImportComment {
                    created_at: comment.created_at,
                    body: &comment.body,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ImportResponse {
    id: Option<u64>,
    status: Option<String>,
    url: Option<String>,
    #[serde(default)]
    errors: Vec<ImportErrorDetail>,
}

impl ImportResponse {
    /// Converts the wire response, falling back to `known_location` when the
    /// response names neither an id nor a URL.
    fn into_receipt(self, known_location: Option<&str>) -> Result<ImportReceipt, DestinationError> {
        let location = self
            .id
            .map(|id| id.to_string())
            .or_else(|| self.url.as_deref().and_then(last_path_segment))
            .or_else(|| known_location.map(str::to_string))
            .ok_or_else(|| DestinationError::InvalidResponse {
                message: "import response has neither id nor url".to_string(),
            })?;

        let status = self.status.ok_or_else(|| DestinationError::InvalidResponse {
            message: format!("import {location} response has no status"),
        })?;

        Ok(ImportReceipt {
            location,
            status: ImportStatus::parse(&status),
            errors: self.errors,
        })
    }
}

fn last_path_segment(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

#[derive(Serialize)]
struct MilestoneRequest<'a> {
    title: &'a str,
    state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_on: Option<DateTime<Utc>>,
    description: &'a str,
}

#[async_trait]
impl Destination for GitHubDestination {
    async fn create_label(&self, label: &Label) -> Result<(), DestinationError> {
        self.guard().await;
        self.client
            .issues(&self.repository.owner, &self.repository.name)
            .create_label(&label.name, &label.color, &label.description)
            .await?;
        Ok(())
    }

    async fn create_milestone(&self, milestone: &Milestone) -> Result<(), DestinationError> {
        self.guard().await;
        let request = MilestoneRequest {
            title: &milestone.title,
            state: milestone.rest_state(),
            due_on: milestone.due_on,
            description: &milestone.description,
        };
        let _: serde_json::Value = self
            .client
            .post(self.route("milestones"), Some(&request))
            .await?;
        Ok(())
    }

    async fn start_import(
        &self,
        payload: &CreationPayload,
    ) -> Result<ImportReceipt, DestinationError> {
        self.guard().await;
        let request = ImportRequest::from(payload);
        let response: ImportResponse = self
            .import_client
            .post(self.route("import/issues"), Some(&request))
            .await?;
        debug!(?response, "Import submitted");
        response.into_receipt(None)
    }

    async fn import_status(&self, location: &str) -> Result<ImportReceipt, DestinationError> {
        let response: ImportResponse = self
            .import_client
            .get(self.route(&format!("import/issues/{location}")), None::<&()>)
            .await?;
        response.into_receipt(Some(location))
    }

    async fn create_issue(&self, payload: &CreationPayload) -> Result<u64, DestinationError> {
        self.guard().await;
        let handler = self
            .client
            .issues(&self.repository.owner, &self.repository.name);
        let mut builder = handler
            .create(&payload.title)
            .body(&payload.body)
            .labels(payload.labels.clone());
        if let Some(assignee) = &payload.assignee {
            builder = builder.assignees(vec![assignee.clone()]);
        }
        if let Some(milestone) = payload.milestone {
            builder = builder.milestone(milestone);
        }
        let issue = builder.send().await?;
        Ok(issue.number)
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<(), DestinationError> {
        self.guard().await;
        self.client
            .issues(&self.repository.owner, &self.repository.name)
            .create_comment(number, body)
            .await?;
        Ok(())
    }

    async fn close_issue(&self, number: u64) -> Result<(), DestinationError> {
        self.guard().await;
        self.client
            .issues(&self.repository.owner, &self.repository.name)
            .update(number)
            .state(IssueState::Closed)
            .send()
            .await?;
        Ok(())
    }

    async fn user_exists(&self, login: &str) -> Result<bool, DestinationError> {
        let result: Result<serde_json::Value, octocrab::Error> =
            self.client.get(format!("/users/{login}"), None::<&()>).await;
        match result.map_err(DestinationError::from) {
            Ok(_) => Ok(true),
            Err(DestinationError::Api { status: 404, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
