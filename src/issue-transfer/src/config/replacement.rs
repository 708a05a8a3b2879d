//! Replacement rule sets.

use crate::config::ConfigError;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// A single literal substitution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplacementRule {
    /// Text to look for.
    pub wrong: String,

    /// Text to put in its place.
    pub right: String,
}

impl ReplacementRule {
    /// Creates a rule.
    pub fn new(wrong: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            wrong: wrong.into(),
            right: right.into(),
        }
    }
}

/// Login and body rewrite rules, applied in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReplacementRules {
    /// Login renames; the first exact match wins.
    #[serde(default)]
    pub user: Vec<ReplacementRule>,

    /// Body substitutions; every rule is applied in turn.
    #[serde(default)]
    pub body: Vec<ReplacementRule>,
}

impl ReplacementRules {
    /// Loads rules from a TOML or YAML file.
    ///
    /// YAML is selected by a `.yml` or `.yaml` extension. A missing file
    /// yields an empty rule set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No replacement rules file, using none");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"));

        let rules = if is_yaml {
            Self::from_yaml(&content, path)?
        } else {
            Self::from_toml(&content, path)?
        };

        debug!(
            path = %path.display(),
            user_rules = rules.user.len(),
            body_rules = rules.body.len(),
            "Loaded replacement rules"
        );
        Ok(rules)
    }

    /// Parses TOML rules (`[[user]]` / `[[body]]` tables).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on parse or validation failure.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let rules: Self = toml::from_str(content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })?;
        rules.validate(path)?;
        Ok(rules)
    }

    /// Parses YAML rules (`user:` / `body:` lists).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on parse or validation failure.
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        // An empty YAML document deserializes as null.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let rules: Self = serde_yaml::from_str(content).map_err(|e| ConfigError::YamlError {
            path: path.display().to_string(),
            source: e,
        })?;
        rules.validate(path)?;
        Ok(rules)
    }

    /// Returns true when there are no rules at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.user.is_empty() && self.body.is_empty()
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let sections = [("user", &self.user), ("body", &self.body)];
        for (section, rules) in sections {
            if let Some(index) = rules.iter().position(|rule| rule.wrong.is_empty()) {
                return Err(ConfigError::ValidationError {
                    path: path.display().to_string(),
                    message: format!("{section} rule #{} has an empty 'wrong' pattern", index + 1),
                });
            }
        }
        Ok(())
    }
}
