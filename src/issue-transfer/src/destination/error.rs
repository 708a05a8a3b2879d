//! Destination error types.

use thiserror::Error;

/// Errors returned by [`Destination`](super::Destination) calls.
#[derive(Debug, Error)]
pub enum DestinationError {
    /// The destination answered and rejected the request.
    #[error("destination rejected request ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never got a definite answer.
    #[error("destination request failed: {message}")]
    Transport { message: String },

    /// The destination answered with something unusable.
    #[error("unexpected destination response: {message}")]
    InvalidResponse { message: String },
}

impl DestinationError {
    /// Returns true for failures worth retrying.
    ///
    /// Only transport failures qualify; an explicit rejection will not
    /// change on a second attempt.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns the HTTP status of an API rejection.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport { .. } | Self::InvalidResponse { .. } => None,
        }
    }
}

impl From<octocrab::Error> for DestinationError {
    fn from(error: octocrab::Error) -> Self {
        match error {
            octocrab::Error::GitHub { source, .. } => Self::Api {
                status: source.status_code.as_u16(),
                message: source.message.clone(),
            },
            other => Self::Transport {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_errors_are_transient() {
        let transport = DestinationError::Transport {
            message: "connection reset".to_string(),
        };
        let api = DestinationError::Api {
            status: 422,
            message: "Validation Failed".to_string(),
        };

        assert!(transport.is_transient());
        assert!(!api.is_transient());
        assert_eq!(api.status(), Some(422));
        assert_eq!(transport.status(), None);
    }
}
