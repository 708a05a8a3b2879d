//! Submission of creation payloads to the destination.
//!
//! A run picks one [`CreationStrategy`] up front: [`ImportStrategy`] for the
//! bulk import endpoint or [`DirectCreateStrategy`] for destinations that
//! only offer the regular issue API.

mod api;
mod attempt;
mod backoff;
mod direct;
pub(crate) mod error;

pub use api::ImportStrategy;
pub use attempt::ImportAttempt;
pub use backoff::{BackoffPolicy, Sleeper, TokioSleeper};
pub use direct::DirectCreateStrategy;
pub use error::ImportError;

use crate::destination::Destination;
use crate::payload::CreationPayload;
use async_trait::async_trait;

/// Result of submitting one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The import was confirmed as `imported`.
    Imported { location: String },

    /// The import was accepted but not awaited.
    Accepted { location: String },

    /// The issue was created directly.
    Created {
        /// Issue number on the destination.
        number: u64,
        /// Comments given up on after a retry.
        comments_dropped: usize,
    },
}

/// One way of getting a payload onto the destination.
#[async_trait]
pub trait CreationStrategy: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the destination keeps the original timestamps. When it does
    /// not, author headers carry the creation time instead.
    fn preserves_timestamps(&self) -> bool;

    /// Submits `payload`, returning once the strategy considers it done.
    async fn submit(
        &self,
        destination: &dyn Destination,
        payload: &CreationPayload,
    ) -> Result<SubmitOutcome, ImportError>;
}
