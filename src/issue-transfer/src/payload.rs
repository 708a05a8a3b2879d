//! Destination-agnostic creation payloads.
//!
//! The [`RequestBuilder`] turns every [`Slot`] into a [`CreationPayload`]
//! that either creation strategy can submit.

use crate::destination::Destination;
use crate::normalizer::TextNormalizer;
use crate::records::Record;
use crate::sequencer::Slot;
use crate::templates::{HeaderRenderer, TemplateError};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Title given to placeholder issues.
pub const PLACEHOLDER_TITLE: &str = "Dummy";

/// Body given to placeholder issues.
pub const PLACEHOLDER_BODY: &str = "This is a dummy to align the issue numbers for move.";

/// A comment ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadComment {
    /// Body including the author header.
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to create one issue on the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreationPayload {
    pub title: String,
    /// Body including the author header.
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed: bool,
    pub labels: Vec<String>,
    /// Assignee confirmed to exist on the destination.
    pub assignee: Option<String>,
    pub milestone: Option<u64>,
    pub comments: Vec<PayloadComment>,
}

impl CreationPayload {
    /// Builds the payload for a placeholder slot.
    #[must_use]
    pub fn placeholder(now: DateTime<Utc>) -> Self {
        Self {
            title: PLACEHOLDER_TITLE.to_string(),
            body: PLACEHOLDER_BODY.to_string(),
            created_at: now,
            updated_at: now,
            closed_at: Some(now),
            closed: true,
            labels: Vec::new(),
            assignee: None,
            milestone: None,
            comments: Vec::new(),
        }
    }
}

/// Converts slots into creation payloads.
pub struct RequestBuilder<'a> {
    normalizer: &'a TextNormalizer,
    renderer: &'a HeaderRenderer,
}

impl<'a> RequestBuilder<'a> {
    /// Creates a builder.
    #[must_use]
    pub fn new(normalizer: &'a TextNormalizer, renderer: &'a HeaderRenderer) -> Self {
        Self {
            normalizer,
            renderer,
        }
    }

    /// Builds the payload for `slot`.
    ///
    /// `destination` is only consulted to confirm the assignee exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an author header fails to render.
    pub async fn build(
        &self,
        slot: &Slot,
        destination: &dyn Destination,
    ) -> Result<CreationPayload, TemplateError> {
        match slot {
            Slot::Placeholder { .. } => Ok(CreationPayload::placeholder(Utc::now())),
            Slot::Record(record) => self.build_record(record, destination).await,
        }
    }

    async fn build_record(
        &self,
        record: &Record,
        destination: &dyn Destination,
    ) -> Result<CreationPayload, TemplateError> {
        let body = self.render_body(record)?;

        let comments = record
            .comments
            .iter()
            .map(|comment| {
                let header = self.renderer.render(&comment.author, comment.created_at)?;
                Ok(PayloadComment {
                    body: header + &self.normalizer.normalize_body(&comment.body),
                    created_at: comment.created_at,
                })
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;

        let assignee = match &record.assignee_login {
            Some(login) => self.normalizer.resolve_assignee(login, destination).await,
            None => None,
        };

        Ok(CreationPayload {
            title: record.title.clone(),
            body,
            created_at: record.created_at,
            updated_at: record.updated_at,
            closed_at: record.closed_at.filter(|_| record.closed),
            closed: record.closed,
            labels: record.labels.clone(),
            assignee,
            milestone: record.milestone_number.filter(|number| *number > 0),
            comments,
        })
    }

    fn render_body(&self, record: &Record) -> Result<String, TemplateError> {
        let header = self.renderer.render(&record.author, record.created_at)?;
        Ok(header + &self.normalizer.normalize_body(&record.body))
    }
}
