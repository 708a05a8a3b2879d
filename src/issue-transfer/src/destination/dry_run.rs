//! A destination wrapper that never mutates anything.

use super::{Destination, DestinationError, ImportReceipt, ImportStatus};
use crate::payload::CreationPayload;
use crate::records::{Label, Milestone};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Wraps a real destination, short-circuiting every mutating call.
///
/// Writes are logged and reported as successful: imports come back as
/// `imported` and directly created issues get consecutive numbers starting
/// at 1. [`Destination::user_exists`] still reaches the wrapped destination
/// so assignee resolution behaves as in a live run.
pub struct DryRunDestination {
    inner: Box<dyn Destination>,
    next_number: AtomicU64,
}

impl DryRunDestination {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: Box<dyn Destination>) -> Self {
        Self {
            inner,
            next_number: AtomicU64::new(1),
        }
    }

    fn allocate(&self) -> u64 {
        self.next_number.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl Destination for DryRunDestination {
    async fn create_label(&self, label: &Label) -> Result<(), DestinationError> {
        info!(name = %label.name, "[DRY RUN] Would create label");
        Ok(())
    }

    async fn create_milestone(&self, milestone: &Milestone) -> Result<(), DestinationError> {
        info!(title = %milestone.title, "[DRY RUN] Would create milestone");
        Ok(())
    }

    async fn start_import(
        &self,
        payload: &CreationPayload,
    ) -> Result<ImportReceipt, DestinationError> {
        let number = self.allocate();
        info!(
            number,
            title = %payload.title,
            comments = payload.comments.len(),
            "[DRY RUN] Would import issue"
        );
        Ok(ImportReceipt {
            location: format!("dry-run-{number}"),
            status: ImportStatus::Imported,
            errors: Vec::new(),
        })
    }

    async fn import_status(&self, location: &str) -> Result<ImportReceipt, DestinationError> {
        Ok(ImportReceipt {
            location: location.to_string(),
            status: ImportStatus::Imported,
            errors: Vec::new(),
        })
    }

    async fn create_issue(&self, payload: &CreationPayload) -> Result<u64, DestinationError> {
        let number = self.allocate();
        info!(number, title = %payload.title, "[DRY RUN] Would create issue");
        Ok(number)
    }

    async fn create_comment(&self, number: u64, _body: &str) -> Result<(), DestinationError> {
        info!(number, "[DRY RUN] Would create comment");
        Ok(())
    }

    async fn close_issue(&self, number: u64) -> Result<(), DestinationError> {
        info!(number, "[DRY RUN] Would close issue");
        Ok(())
    }

    async fn user_exists(&self, login: &str) -> Result<bool, DestinationError> {
        self.inner.user_exists(login).await
    }
}
