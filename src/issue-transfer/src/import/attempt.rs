//! Polling state machine for a single import.

use super::{BackoffPolicy, ImportError, Sleeper};
use crate::destination::{Destination, ImportErrorDetail, ImportReceipt, ImportStatus};
use std::time::Duration;
use tracing::debug;

/// State of one submitted import, from submission until a terminal status.
///
/// The delay starts at the policy's initial value for every attempt; nothing
/// carries over between slots.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportAttempt {
    location: String,
    status: ImportStatus,
    errors: Vec<ImportErrorDetail>,
    attempt_count: u32,
    current_delay: Duration,
}

impl ImportAttempt {
    /// Starts tracking a freshly submitted import.
    #[must_use]
    pub fn submitted(receipt: ImportReceipt, policy: &BackoffPolicy) -> Self {
        Self {
            location: receipt.location,
            status: receipt.status,
            errors: receipt.errors,
            attempt_count: 0,
            current_delay: policy.initial_delay,
        }
    }

    /// Reference used to poll this import.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Last observed status.
    #[must_use]
    pub fn status(&self) -> &ImportStatus {
        &self.status
    }

    /// Polls performed so far.
    #[must_use]
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Delay before the next poll.
    #[must_use]
    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    /// Fails on a terminal non-`imported` status.
    ///
    /// Returns `Ok(true)` once imported and `Ok(false)` while pending.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Rejected`] for any status other than
    /// `pending` or `imported`.
    pub fn check(&self) -> Result<bool, ImportError> {
        match &self.status {
            ImportStatus::Imported => Ok(true),
            ImportStatus::Pending => Ok(false),
            ImportStatus::Failed(raw) => Err(ImportError::Rejected {
                location: self.location.clone(),
                status: raw.clone(),
                errors: self.errors.clone(),
            }),
        }
    }

    /// Polls until the import is `imported`, returning its location.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Rejected`] on a failed status,
    /// [`ImportError::RetryExhausted`] once `policy.max_retries` polls have
    /// not settled it and [`ImportError::Poll`] if a poll request fails.
    pub async fn run_to_completion(
        mut self,
        destination: &dyn Destination,
        policy: &BackoffPolicy,
        sleeper: &dyn Sleeper,
    ) -> Result<String, ImportError> {
        loop {
            if self.check()? {
                return Ok(self.location);
            }

            if self.attempt_count >= policy.max_retries {
                return Err(ImportError::RetryExhausted {
                    location: self.location,
                    attempts: self.attempt_count,
                    last_status: self.status.to_string(),
                });
            }

            debug!(
                location = %self.location,
                attempt = self.attempt_count + 1,
                delay_ms = self.current_delay.as_millis() as u64,
                "Import pending, waiting before next poll"
            );
            sleeper.sleep(self.current_delay).await;
            self.current_delay = policy.next_delay(self.current_delay);

            let receipt = destination
                .import_status(&self.location)
                .await
                .map_err(|source| ImportError::Poll {
                    location: self.location.clone(),
                    source,
                })?;
            self.observe(receipt);
        }
    }

    fn observe(&mut self, receipt: ImportReceipt) {
        self.status = receipt.status;
        self.errors = receipt.errors;
        self.attempt_count += 1;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::destination::DestinationError;
    use crate::payload::CreationPayload;
    use crate::records::{Label, Milestone};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Records every requested sleep instead of waiting.
    #[derive(Default)]
    pub(crate) struct RecordingSleeper {
        pub(crate) sleeps: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    /// Answers status polls from a script; an empty script keeps answering
    /// `pending`.
    #[derive(Default)]
    pub(crate) struct ScriptedPolls {
        pub(crate) script: Mutex<VecDeque<Result<ImportReceipt, DestinationError>>>,
        pub(crate) polls: Mutex<u32>,
    }

    impl ScriptedPolls {
        pub(crate) fn with(statuses: &[&str]) -> Self {
            let script = statuses
                .iter()
                .map(|status| Ok(receipt(status)))
                .collect();
            Self {
                script: Mutex::new(script),
                polls: Mutex::new(0),
            }
        }
    }

    pub(crate) fn receipt(status: &str) -> ImportReceipt {
        ImportReceipt {
            location: "77".to_string(),
            status: ImportStatus::parse(status),
            errors: Vec::new(),
        }
    }

    #[async_trait]
    impl Destination for ScriptedPolls {
        async fn create_label(&self, _: &Label) -> Result<(), DestinationError> {
            unreachable!()
        }
        async fn create_milestone(&self, _: &Milestone) -> Result<(), DestinationError> {
            unreachable!()
        }
        async fn start_import(&self, _: &CreationPayload) -> Result<ImportReceipt, DestinationError> {
            Ok(receipt("pending"))
        }
        async fn import_status(&self, _: &str) -> Result<ImportReceipt, DestinationError> {
            *self.polls.lock().unwrap() += 1;
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(receipt("pending")))
        }
        async fn create_issue(&self, _: &CreationPayload) -> Result<u64, DestinationError> {
            unreachable!()
        }
        async fn create_comment(&self, _: u64, _: &str) -> Result<(), DestinationError> {
            unreachable!()
        }
        async fn close_issue(&self, _: u64) -> Result<(), DestinationError> {
            unreachable!()
        }
        async fn user_exists(&self, _: &str) -> Result<bool, DestinationError> {
            Ok(true)
        }
    }

    fn assert_close(actual: Duration, expected_ms: f64) {
        let diff = (actual.as_secs_f64() * 1000.0 - expected_ms).abs();
        assert!(diff < 1.0, "{actual:?} != {expected_ms}ms");
    }

    #[tokio::test]
    async fn imported_on_submission_needs_no_poll() {
        let destination = ScriptedPolls::default();
        let sleeper = RecordingSleeper::default();
        let policy = BackoffPolicy::default();

        let attempt = ImportAttempt::submitted(receipt("imported"), &policy);
        let location = attempt
            .run_to_completion(&destination, &policy, &sleeper)
            .await
            .unwrap();

        assert_eq!(location, "77");
        assert_eq!(*destination.polls.lock().unwrap(), 0);
        assert!(sleeper.sleeps.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn polls_until_imported() {
        let destination = ScriptedPolls::with(&["pending", "pending", "imported"]);
        let sleeper = RecordingSleeper::default();
        let policy = BackoffPolicy::default();

        let attempt = ImportAttempt::submitted(receipt("pending"), &policy);
        attempt
            .run_to_completion(&destination, &policy, &sleeper)
            .await
            .unwrap();

        assert_eq!(*destination.polls.lock().unwrap(), 3);
        let sleeps = sleeper.sleeps.lock().unwrap();
        assert_eq!(sleeps.len(), 3);
        assert_close(sleeps[0], 1000.0);
        assert_close(sleeps[1], 1600.0);
        assert_close(sleeps[2], 2560.0);
    }

    #[tokio::test]
    async fn exhausts_after_ten_retries_without_eleventh_sleep() {
        let destination = ScriptedPolls::default();
        let sleeper = RecordingSleeper::default();
        let policy = BackoffPolicy::default();

        let attempt = ImportAttempt::submitted(receipt("pending"), &policy);
        let result = attempt
            .run_to_completion(&destination, &policy, &sleeper)
            .await;

        match result {
            Err(ImportError::RetryExhausted {
                location,
                attempts,
                last_status,
            }) => {
                assert_eq!(location, "77");
                assert_eq!(attempts, 10);
                assert_eq!(last_status, "pending");
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }

        assert_eq!(*destination.polls.lock().unwrap(), 10);
        let sleeps = sleeper.sleeps.lock().unwrap();
        assert_eq!(sleeps.len(), 10);
        for (k, delay) in sleeps.iter().enumerate() {
            assert_close(*delay, 1000.0 * 1.6_f64.powi(k as i32));
        }
    }

    #[tokio::test]
    async fn failed_status_is_rejected_with_details() {
        let mut failed = receipt("failed");
        failed.errors = vec![ImportErrorDetail {
            field: Some("assignee".to_string()),
            code: Some("invalid".to_string()),
            ..ImportErrorDetail::default()
        }];
        let destination = ScriptedPolls {
            script: Mutex::new(VecDeque::from([Ok(receipt("pending")), Ok(failed)])),
            polls: Mutex::new(0),
        };
        let sleeper = RecordingSleeper::default();
        let policy = BackoffPolicy::default();

        let result = ImportAttempt::submitted(receipt("pending"), &policy)
            .run_to_completion(&destination, &policy, &sleeper)
            .await;

        match result {
            Err(ImportError::Rejected { status, errors, .. }) => {
                assert_eq!(status, "failed");
                assert_eq!(errors[0].field.as_deref(), Some("assignee"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
        assert_eq!(sleeper.sleeps.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_status_counts_as_failed() {
        let destination = ScriptedPolls::default();
        let sleeper = RecordingSleeper::default();
        let policy = BackoffPolicy::default();

        let result = ImportAttempt::submitted(receipt("exploded"), &policy)
            .run_to_completion(&destination, &policy, &sleeper)
            .await;

        assert!(matches!(result, Err(ImportError::Rejected { status, .. }) if status == "exploded"));
        assert!(sleeper.sleeps.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn poll_failure_is_fatal() {
        let destination = ScriptedPolls {
            script: Mutex::new(VecDeque::from([Err(DestinationError::Transport {
                message: "reset".to_string(),
            })])),
            polls: Mutex::new(0),
        };
        let sleeper = RecordingSleeper::default();
        let policy = BackoffPolicy::default();

        let result = ImportAttempt::submitted(receipt("pending"), &policy)
            .run_to_completion(&destination, &policy, &sleeper)
            .await;

        assert!(matches!(result, Err(ImportError::Poll { .. })));
    }

    #[test]
    fn submitted_attempt_starts_fresh() {
        let policy = BackoffPolicy::default();
        let attempt = ImportAttempt::submitted(receipt("pending"), &policy);

        assert_eq!(attempt.location(), "77");
        assert_eq!(attempt.status(), &ImportStatus::Pending);
        assert_eq!(attempt.attempt_count(), 0);
        assert_eq!(attempt.current_delay(), Duration::from_millis(1000));
    }
}
