//! Counters collected over a complete run.

use crate::import::SubmitOutcome;
use crate::records::RecordKind;
use crate::sequencer::Slot;

/// Summary of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Whether this was a dry run.
    pub dry_run: bool,

    /// Number of labels created.
    pub labels_created: usize,

    /// Number of milestones created.
    pub milestones_created: usize,

    /// Number of issues replayed.
    pub issues: usize,

    /// Number of pull requests replayed as issues.
    pub pull_requests: usize,

    /// Number of placeholders submitted to fill gaps.
    pub placeholders: usize,

    /// Comments given up on after a retry.
    pub comments_dropped: usize,

    /// Imports accepted without waiting for completion.
    pub pending_imports: Vec<String>,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Updates the summary with the outcome of one slot.
    pub fn record(&mut self, slot: &Slot, outcome: &SubmitOutcome) {
        match slot {
            Slot::Placeholder { .. } => self.placeholders += 1,
            Slot::Record(record) => match record.kind {
                RecordKind::Issue => self.issues += 1,
                RecordKind::PullRequest => self.pull_requests += 1,
            },
        }

        match outcome {
            SubmitOutcome::Accepted { location } => self.pending_imports.push(location.clone()),
            SubmitOutcome::Created {
                comments_dropped, ..
            } => self.comments_dropped += comments_dropped,
            SubmitOutcome::Imported { .. } => {}
        }
    }

    /// Total number of slots submitted.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.issues + self.pull_requests + self.placeholders
    }

    /// Returns true if anything was lost along the way.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.comments_dropped > 0
    }

    /// Returns true if every record arrived complete.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }
}
