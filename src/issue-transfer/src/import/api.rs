//! Import-API strategy.

use super::{BackoffPolicy, CreationStrategy, ImportAttempt, ImportError, Sleeper, SubmitOutcome};
use crate::destination::Destination;
use crate::payload::CreationPayload;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Whether and how submitted imports are awaited.
enum Mode {
    Synchronous {
        policy: BackoffPolicy,
        sleeper: Arc<dyn Sleeper>,
    },
    FireAndForget,
}

/// Creates each issue with its comments in one import request.
///
/// In synchronous mode every import is polled until it is `imported`, which
/// guarantees the next submission lands on the next number. Fire-and-forget
/// mode returns as soon as the request is accepted.
pub struct ImportStrategy {
    mode: Mode,
}

impl ImportStrategy {
    /// Creates a strategy that waits for every import.
    #[must_use]
    pub fn synchronous(policy: BackoffPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            mode: Mode::Synchronous { policy, sleeper },
        }
    }

    /// Creates a strategy that does not wait for imports to finish.
    #[must_use]
    pub fn fire_and_forget() -> Self {
        Self {
            mode: Mode::FireAndForget,
        }
    }

    /// Returns true if imports are awaited.
    #[must_use]
    pub fn is_synchronous(&self) -> bool {
        matches!(self.mode, Mode::Synchronous { .. })
    }
}

#[async_trait]
impl CreationStrategy for ImportStrategy {
    fn name(&self) -> &'static str {
        match self.mode {
            Mode::Synchronous { .. } => "import",
            Mode::FireAndForget => "import (fire-and-forget)",
        }
    }

    fn preserves_timestamps(&self) -> bool {
        true
    }

    async fn submit(
        &self,
        destination: &dyn Destination,
        payload: &CreationPayload,
    ) -> Result<SubmitOutcome, ImportError> {
        let receipt = destination
            .start_import(payload)
            .await
            .map_err(|source| ImportError::Submission {
                what: format!("import of '{}'", payload.title),
                source,
            })?;

        info!(
            location = %receipt.location,
            status = %receipt.status,
            title = %payload.title,
            "Requested issue import"
        );

        let (policy, sleeper) = match &self.mode {
            Mode::Synchronous { policy, sleeper } => (policy, sleeper),
            Mode::FireAndForget => {
                let attempt = ImportAttempt::submitted(receipt, &BackoffPolicy::default());
                attempt.check()?;
                return Ok(SubmitOutcome::Accepted {
                    location: attempt.location().to_string(),
                });
            }
        };

        let location = ImportAttempt::submitted(receipt, policy)
            .run_to_completion(destination, policy, sleeper.as_ref())
            .await?;
        info!(location = %location, "Issue imported");
        Ok(SubmitOutcome::Imported { location })
    }
}
