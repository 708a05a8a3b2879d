//! Orchestrates a complete transfer.
//!
//! A run fetches everything from the origin first, validates the slot plan,
//! then writes labels, milestones and finally one issue per slot, strictly
//! in number order. Nothing is written before the plan is known to be safe.

mod config;
mod error;

pub use config::{CreationMode, RunFlags, RunnerConfig, DEFAULT_REPLACE_PATH};
pub use error::TransferError;

use crate::config::{ConfigError, ReplacementRules};
use crate::destination::{Destination, DryRunDestination, GitHubDestination, ImportStatus};
use crate::import::{
    BackoffPolicy, CreationStrategy, DirectCreateStrategy, ImportStrategy, Sleeper, TokioSleeper,
};
use crate::normalizer::TextNormalizer;
use crate::payload::RequestBuilder;
use crate::records::{Label, Milestone};
use crate::sequencer::Sequencer;
use crate::source::{GitHubSource, RecordSource};
use crate::summary::RunSummary;
use crate::templates::{HeaderOptions, HeaderRenderer};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

/// An origin assignee that exists on the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssigneeMatch {
    /// Issue or pull request number.
    pub number: u64,
    /// Login after user replacement.
    pub login: String,
}

/// Replays an origin repository onto a destination.
pub struct Runner {
    config: RunnerConfig,
    normalizer: TextNormalizer,
    source: Box<dyn RecordSource>,
    destination: Box<dyn Destination>,
    sleeper: Arc<dyn Sleeper>,
    policy: BackoffPolicy,
}

impl Runner {
    /// Builds a runner talking to GitHub on both ends.
    ///
    /// # Errors
    ///
    /// Returns an error if a client cannot be built or the replacement rule
    /// file is invalid.
    pub fn new(config: RunnerConfig) -> Result<Self, TransferError> {
        let source = GitHubSource::new(
            config.source().clone(),
            &config.source_endpoint()?,
            config.source_token(),
        )?;
        let destination = GitHubDestination::new(
            config.destination().clone(),
            &config.destination_endpoint()?,
            config.destination_token(),
        )?;

        Self::from_parts(config, Box::new(source), Box::new(destination))
    }

    /// Builds a runner around existing source and destination handles.
    ///
    /// The destination is wrapped in a [`DryRunDestination`] when the
    /// configuration asks for a dry run.
    ///
    /// # Errors
    ///
    /// Returns an error if the replacement rule file is invalid.
    pub fn from_parts(
        config: RunnerConfig,
        source: Box<dyn RecordSource>,
        destination: Box<dyn Destination>,
    ) -> Result<Self, TransferError> {
        let rules = ReplacementRules::load(config.replace_path())?;
        debug!(
            path = %config.replace_path().display(),
            user_rules = rules.user.len(),
            body_rules = rules.body.len(),
            "Loaded replacement rules"
        );

        let destination: Box<dyn Destination> = if config.dry_run() {
            Box::new(DryRunDestination::new(destination))
        } else {
            destination
        };

        Ok(Self {
            config,
            normalizer: TextNormalizer::new(rules),
            source,
            destination,
            sleeper: Arc::new(TokioSleeper),
            policy: BackoffPolicy::default(),
        })
    }

    /// Replaces the sleeper used between import polls.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Replaces the backoff policy for synchronous imports.
    #[must_use]
    pub fn with_backoff(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the run configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    fn strategy(&self) -> Box<dyn CreationStrategy> {
        match self.config.mode() {
            CreationMode::ImportSync => Box::new(ImportStrategy::synchronous(
                self.policy,
                self.sleeper.clone(),
            )),
            CreationMode::ImportFireAndForget => Box::new(ImportStrategy::fire_and_forget()),
            CreationMode::DirectCreate => Box::new(DirectCreateStrategy),
        }
    }

    /// Executes the full transfer.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error. Whatever was created before it stays
    /// on the destination.
    pub async fn run(&self) -> Result<RunSummary, TransferError> {
        let flags = self.config.flags();
        let mut summary = RunSummary::new(flags.dry_run);
        let strategy = self.strategy();

        info!(
            source = %self.config.source(),
            destination = %self.config.destination(),
            strategy = strategy.name(),
            dry_run = flags.dry_run,
            "Starting transfer"
        );

        let labels = if flags.skip_labels {
            Vec::new()
        } else {
            self.source.labels().await?
        };
        let milestones = if flags.skip_milestones {
            Vec::new()
        } else {
            self.source.milestones().await?
        };
        let (issues, pulls) =
            futures::try_join!(self.source.issues(), self.source.pull_requests())?;
        info!(
            labels = labels.len(),
            milestones = milestones.len(),
            issues = issues.len(),
            pull_requests = pulls.len(),
            "Fetched origin repository"
        );

        let sequencer = Sequencer::new(issues, pulls)?;
        info!(
            slots = sequencer.len(),
            placeholders = sequencer.placeholder_count(),
            "Planned slot sequence"
        );

        if self.config.mode() == CreationMode::ImportFireAndForget
            && sequencer.placeholder_count() > 0
        {
            return Err(ConfigError::UnsafeFireAndForget {
                placeholders: sequencer.placeholder_count(),
            }
            .into());
        }

        summary.labels_created = self.create_labels(&labels).await?;
        summary.milestones_created = self.create_milestones(&milestones).await?;

        let renderer = HeaderRenderer::new(HeaderOptions {
            skip_avatars: flags.skip_avatars,
            include_timestamp: !strategy.preserves_timestamps(),
        });
        let builder = RequestBuilder::new(&self.normalizer, &renderer);
        let total = sequencer.len();

        for slot in sequencer {
            let span = info_span!("slot", number = slot.number(), kind = slot.kind_str());

            let outcome = async {
                debug!(total, "Building payload");
                let payload = builder.build(&slot, self.destination.as_ref()).await?;
                let outcome = strategy
                    .submit(self.destination.as_ref(), &payload)
                    .await?;
                Ok::<_, TransferError>(outcome)
            }
            .instrument(span)
            .await?;

            summary.record(&slot, &outcome);
        }

        if !summary.pending_imports.is_empty() {
            self.report_import_statuses(&summary.pending_imports).await;
        }

        info!(slots = summary.slots(), "Transfer finished");
        Ok(summary)
    }

    async fn create_labels(&self, labels: &[Label]) -> Result<usize, TransferError> {
        for label in labels {
            self.destination
                .create_label(label)
                .await
                .map_err(|source| TransferError::Submission {
                    what: format!("label '{}'", label.name),
                    source,
                })?;
            info!(name = %label.name, "Created label");
        }
        Ok(labels.len())
    }

    async fn create_milestones(&self, milestones: &[Milestone]) -> Result<usize, TransferError> {
        for milestone in milestones {
            self.destination
                .create_milestone(milestone)
                .await
                .map_err(|source| TransferError::Submission {
                    what: format!("milestone '{}'", milestone.title),
                    source,
                })?;
            info!(number = milestone.number, title = %milestone.title, "Created milestone");
        }
        Ok(milestones.len())
    }

    /// Polls every unawaited import once and logs the ones not yet imported.
    async fn report_import_statuses(&self, locations: &[String]) {
        for location in locations {
            match self.destination.import_status(location).await {
                Ok(receipt) if receipt.status == ImportStatus::Imported => {
                    debug!(location = %location, "Import finished");
                }
                Ok(receipt) => {
                    warn!(
                        location = %location,
                        status = %receipt.status,
                        "Import not finished"
                    );
                    for detail in &receipt.errors {
                        warn!(location = %location, "  {detail}");
                    }
                }
                Err(e) => {
                    warn!(location = %location, error = %e, "Failed to check import status");
                }
            }
        }
    }

    /// Lists origin assignees that exist on the destination.
    ///
    /// Performs no writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the origin cannot be read.
    pub async fn show_assignees(&self) -> Result<Vec<AssigneeMatch>, TransferError> {
        let (issues, pulls) =
            futures::try_join!(self.source.issues(), self.source.pull_requests())?;

        let mut records: Vec<_> = issues.into_iter().chain(pulls).collect();
        records.sort_by_key(|record| record.number);

        let mut matches = Vec::new();
        for record in &records {
            let Some(login) = &record.assignee_login else {
                continue;
            };
            if let Some(login) = self
                .normalizer
                .resolve_assignee(login, self.destination.as_ref())
                .await
            {
                matches.push(AssigneeMatch {
                    number: record.number,
                    login,
                });
            }
        }

        Ok(matches)
    }
}
