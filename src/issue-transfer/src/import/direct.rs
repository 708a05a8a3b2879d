//! Direct-create strategy.

use super::{CreationStrategy, ImportError, SubmitOutcome};
use crate::destination::Destination;
use crate::payload::CreationPayload;
use async_trait::async_trait;
use tracing::{info, warn};

/// Creates the issue, appends comments one by one, then closes it if needed.
///
/// For destinations without the import endpoint. Creation times cannot be
/// set this way, so author headers carry them instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectCreateStrategy;

impl DirectCreateStrategy {
    /// Posts one comment, retrying a transient failure once.
    ///
    /// Returns `Ok(false)` if the comment was dropped.
    async fn post_comment(
        destination: &dyn Destination,
        number: u64,
        body: &str,
    ) -> Result<bool, ImportError> {
        let error = match destination.create_comment(number, body).await {
            Ok(()) => return Ok(true),
            Err(e) if e.is_transient() => e,
            Err(e) => {
                return Err(ImportError::Submission {
                    what: format!("comment on #{number}"),
                    source: e,
                })
            }
        };

        warn!(number, error = %error, "Comment creation failed, retrying once");
        match destination.create_comment(number, body).await {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(number, error = %e, "Comment retry failed, dropping comment");
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl CreationStrategy for DirectCreateStrategy {
    fn name(&self) -> &'static str {
        "direct-create"
    }

    fn preserves_timestamps(&self) -> bool {
        false
    }

    async fn submit(
        &self,
        destination: &dyn Destination,
        payload: &CreationPayload,
    ) -> Result<SubmitOutcome, ImportError> {
        let number = destination
            .create_issue(payload)
            .await
            .map_err(|source| ImportError::Submission {
                what: format!("issue '{}'", payload.title),
                source,
            })?;
        info!(number, title = %payload.title, "Created issue");

        let mut comments_dropped = 0;
        for comment in &payload.comments {
            if !Self::post_comment(destination, number, &comment.body).await? {
                comments_dropped += 1;
            }
        }

        if payload.closed {
            destination
                .close_issue(number)
                .await
                .map_err(|source| ImportError::Submission {
                    what: format!("close of #{number}"),
                    source,
                })?;
            info!(number, "Closed issue");
        }

        Ok(SubmitOutcome::Created {
            number,
            comments_dropped,
        })
    }
}
