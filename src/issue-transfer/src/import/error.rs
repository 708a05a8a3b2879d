//! Import driver error types.

use crate::destination::{DestinationError, ImportErrorDetail};
use thiserror::Error;

/// Errors that stop the replay of a slot. All of them are fatal for the run.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The destination refused the creation request.
    #[error("Failed to submit {what}: {source}")]
    Submission {
        what: String,
        #[source]
        source: DestinationError,
    },

    /// Polling an import failed.
    #[error("Failed to poll import {location}: {source}")]
    Poll {
        location: String,
        #[source]
        source: DestinationError,
    },

    /// The import reached a status other than `imported`.
    #[error("Import {location} ended with status '{status}'{}", render_details(.errors))]
    Rejected {
        location: String,
        status: String,
        errors: Vec<ImportErrorDetail>,
    },

    /// The import was still pending when the retry budget ran out.
    #[error("Import {location} still '{last_status}' after {attempts} retries")]
    RetryExhausted {
        location: String,
        attempts: u32,
        last_status: String,
    },
}

pub(crate) fn render_details(errors: &[ImportErrorDetail]) -> String {
    errors
        .iter()
        .map(|detail| format!("\n  {detail}"))
        .collect()
}
