//! Run-level error types.

use crate::config::ConfigError;
use crate::destination::{DestinationError, ImportErrorDetail};
use crate::import::error::render_details;
use crate::import::ImportError;
use crate::sequencer::SequenceError;
use crate::source::SourceError;
use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that abort a transfer.
///
/// Anything created on the destination before the error stays there.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Invalid run configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading the origin repository failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The origin numbering cannot be replayed.
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// An author header failed to render.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Client(#[from] octocrab::Error),

    /// The destination refused a request.
    #[error("Failed to submit {what}: {source}")]
    Submission {
        what: String,
        #[source]
        source: DestinationError,
    },

    /// An import ended with a status other than `imported`.
    #[error("Import {location} ended with status '{status}'{}", render_details(.errors))]
    ImportRejected {
        location: String,
        status: String,
        errors: Vec<ImportErrorDetail>,
    },

    /// An import never left `pending`.
    #[error("Import {location} still '{last_status}' after {attempts} retries")]
    RetryExhausted {
        location: String,
        attempts: u32,
        last_status: String,
    },
}

impl From<ImportError> for TransferError {
    fn from(error: ImportError) -> Self {
        match error {
            ImportError::Submission { what, source } => Self::Submission { what, source },
            ImportError::Poll { location, source } => Self::Submission {
                what: format!("status poll of import {location}"),
                source,
            },
            ImportError::Rejected {
                location,
                status,
                errors,
            } => Self::ImportRejected {
                location,
                status,
                errors,
            },
            ImportError::RetryExhausted {
                location,
                attempts,
                last_status,
            } => Self::RetryExhausted {
                location,
                attempts,
                last_status,
            },
        }
    }
}
