//! Repository identifiers.

use crate::config::ConfigError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A repository in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryId {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,
}

impl RepositoryId {
    /// Parses an `owner/name` string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRepository`] unless the value has exactly
    /// two non-empty segments.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidRepository {
            value: value.to_string(),
        };

        let (owner, name) = value.trim().split_once('/').ok_or_else(invalid)?;
        let (owner, name) = (owner.trim(), name.trim());
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Returns the `owner/name` form.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_and_name() {
        let id = RepositoryId::parse("octo/hello-world").unwrap();
        assert_eq!(id.owner, "octo");
        assert_eq!(id.name, "hello-world");
        assert_eq!(id.to_string(), "octo/hello-world");
    }

    #[test]
    fn rejects_malformed_values() {
        for value in ["", "octo", "/repo", "octo/", "a/b/c"] {
            assert!(
                matches!(
                    RepositoryId::parse(value),
                    Err(ConfigError::InvalidRepository { .. })
                ),
                "{value} should be rejected"
            );
        }
    }
}
