//! Run configuration.

use crate::config::{parse_endpoint, ConfigError, RepositoryId, DEFAULT_ENDPOINT};
use std::path::{Path, PathBuf};
use url::Url;

/// Default location of the replacement rule file.
pub const DEFAULT_REPLACE_PATH: &str = "replace.toml";

/// How issues are created on the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CreationMode {
    /// Import API, waiting for every import before the next one.
    #[default]
    ImportSync,

    /// Import API without waiting. Only safe when there are no gaps.
    ImportFireAndForget,

    /// Regular issue API, one call per issue and comment.
    DirectCreate,
}

/// Switches that narrow down what a run does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunFlags {
    /// Do not fetch or create labels.
    pub skip_labels: bool,

    /// Do not fetch or create milestones.
    pub skip_milestones: bool,

    /// Leave avatars out of author headers.
    pub skip_avatars: bool,

    /// Log destination writes instead of performing them.
    pub dry_run: bool,
}

/// Where a repository lives and how to authenticate against it.
///
/// A missing endpoint means the public GitHub API.
#[derive(Debug, Clone, Default)]
struct Access {
    endpoint: Option<Url>,
    token: Option<String>,
}

impl Access {
    fn endpoint(&self) -> Result<Url, ConfigError> {
        match &self.endpoint {
            Some(endpoint) => Ok(endpoint.clone()),
            None => parse_endpoint(DEFAULT_ENDPOINT),
        }
    }
}

/// Configuration for a transfer run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    source: RepositoryId,
    destination: RepositoryId,
    source_access: Access,
    destination_access: Access,
    mode: CreationMode,
    flags: RunFlags,
    replace_path: PathBuf,
}

impl RunnerConfig {
    /// Creates a configuration using the public GitHub endpoint and no tokens.
    #[must_use]
    pub fn new(source: RepositoryId, destination: RepositoryId, mode: CreationMode) -> Self {
        Self {
            source,
            destination,
            source_access: Access::default(),
            destination_access: Access::default(),
            mode,
            flags: RunFlags::default(),
            replace_path: PathBuf::from(DEFAULT_REPLACE_PATH),
        }
    }

    /// Sets the endpoint and token used to read the origin.
    #[must_use]
    pub fn with_source_access(mut self, endpoint: Url, token: Option<String>) -> Self {
        self.source_access = Access {
            endpoint: Some(endpoint),
            token,
        };
        self
    }

    /// Sets the endpoint and token used to write to the destination.
    #[must_use]
    pub fn with_destination_access(mut self, endpoint: Url, token: Option<String>) -> Self {
        self.destination_access = Access {
            endpoint: Some(endpoint),
            token,
        };
        self
    }

    /// Sets the run flags.
    #[must_use]
    pub fn with_flags(mut self, flags: RunFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the replacement rule file.
    #[must_use]
    pub fn with_replace_path(mut self, replace_path: PathBuf) -> Self {
        self.replace_path = replace_path;
        self
    }

    /// Returns the origin repository.
    pub fn source(&self) -> &RepositoryId {
        &self.source
    }

    /// Returns the destination repository.
    pub fn destination(&self) -> &RepositoryId {
        &self.destination
    }

    /// Returns the origin API endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] if the default endpoint
    /// cannot be parsed.
    pub fn source_endpoint(&self) -> Result<Url, ConfigError> {
        self.source_access.endpoint()
    }

    /// Returns the origin token, if any.
    pub fn source_token(&self) -> Option<&str> {
        self.source_access.token.as_deref()
    }

    /// Returns the destination API endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] if the default endpoint
    /// cannot be parsed.
    pub fn destination_endpoint(&self) -> Result<Url, ConfigError> {
        self.destination_access.endpoint()
    }

    /// Returns the destination token, if any.
    pub fn destination_token(&self) -> Option<&str> {
        self.destination_access.token.as_deref()
    }

    /// Returns the creation mode.
    pub fn mode(&self) -> CreationMode {
        self.mode
    }

    /// Returns the run flags.
    pub fn flags(&self) -> RunFlags {
        self.flags
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.flags.dry_run
    }

    /// Returns the replacement rule file path.
    pub fn replace_path(&self) -> &Path {
        &self.replace_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(value: &str) -> RepositoryId {
        RepositoryId::parse(value).unwrap()
    }

    #[test]
    fn defaults_to_public_github() {
        let config = RunnerConfig::new(repo("a/b"), repo("c/d"), CreationMode::default());

        assert_eq!(
            config.source_endpoint().unwrap().as_str(),
            "https://api.github.com/"
        );
        assert_eq!(
            config.destination_endpoint().unwrap().as_str(),
            "https://api.github.com/"
        );
        assert_eq!(config.source_token(), None);
        assert_eq!(config.mode(), CreationMode::ImportSync);
        assert_eq!(config.replace_path(), Path::new("replace.toml"));
        assert!(!config.dry_run());
    }

    #[test]
    fn builder_overrides_apply() {
        let endpoint = Url::parse("https://ghe.example.com/api/v3").unwrap();
        let config = RunnerConfig::new(repo("a/b"), repo("c/d"), CreationMode::DirectCreate)
            .with_source_access(endpoint.clone(), Some("src".to_string()))
            .with_destination_access(endpoint, Some("dst".to_string()))
            .with_flags(RunFlags {
                dry_run: true,
                ..RunFlags::default()
            })
            .with_replace_path(PathBuf::from("rules.yaml"));

        assert_eq!(config.source().full_name(), "a/b");
        assert_eq!(config.destination().full_name(), "c/d");
        assert_eq!(config.source_token(), Some("src"));
        assert_eq!(config.destination_token(), Some("dst"));
        assert_eq!(config.source_endpoint().unwrap().host_str(), Some("ghe.example.com"));
        assert!(config.dry_run());
        assert_eq!(config.replace_path(), Path::new("rules.yaml"));
    }
}
