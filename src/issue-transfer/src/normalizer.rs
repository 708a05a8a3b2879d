//! Text and login rewriting ahead of submission.

use crate::config::ReplacementRules;
use crate::destination::Destination;
use tracing::{debug, warn};

/// Applies replacement rules to bodies and assignee logins.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    rules: ReplacementRules,
}

impl TextNormalizer {
    /// Creates a normalizer over a fixed rule set.
    #[must_use]
    pub fn new(rules: ReplacementRules) -> Self {
        Self { rules }
    }

    /// Applies every body rule in order, replacing all occurrences.
    ///
    /// Later rules see the output of earlier ones, so the result is only
    /// idempotent when no replacement produces another rule's pattern.
    #[must_use]
    pub fn normalize_body(&self, text: &str) -> String {
        self.rules
            .body
            .iter()
            .fold(text.to_string(), |text, rule| {
                text.replace(&rule.wrong, &rule.right)
            })
    }

    /// Maps a login through the user rules. The first exact match wins.
    #[must_use]
    pub fn resolve_login<'a>(&'a self, login: &'a str) -> &'a str {
        self.rules
            .user
            .iter()
            .find(|rule| rule.wrong == login)
            .map_or(login, |rule| rule.right.as_str())
    }

    /// Resolves an assignee and confirms it exists on the destination.
    ///
    /// Returns `None` when the user is unknown or the lookup fails; an
    /// assignee is never worth failing the migration over.
    pub async fn resolve_assignee(
        &self,
        login: &str,
        destination: &dyn Destination,
    ) -> Option<String> {
        let resolved = self.resolve_login(login);
        match destination.user_exists(resolved).await {
            Ok(true) => Some(resolved.to_string()),
            Ok(false) => {
                debug!(login, resolved, "Assignee not found on destination, omitting");
                None
            }
            Err(e) => {
                warn!(login, resolved, error = %e, "Assignee lookup failed, omitting");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReplacementRule;

    fn normalizer(user: Vec<ReplacementRule>, body: Vec<ReplacementRule>) -> TextNormalizer {
        TextNormalizer::new(ReplacementRules { user, body })
    }

    #[test]
    fn replaces_every_occurrence_in_order() {
        let normalizer = normalizer(
            Vec::new(),
            vec![
                ReplacementRule::new("ghe.example.com", "github.com"),
                ReplacementRule::new("@alice", "@alice-corp"),
            ],
        );

        assert_eq!(
            normalizer.normalize_body("see ghe.example.com/a and ghe.example.com/b, cc @alice"),
            "see github.com/a and github.com/b, cc @alice-corp"
        );
    }

    #[test]
    fn no_rules_leaves_text_untouched() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.normalize_body("unchanged"), "unchanged");
        assert_eq!(normalizer.resolve_login("bob"), "bob");
    }

    #[test]
    fn normalization_is_idempotent_without_overlap() {
        let normalizer = normalizer(
            Vec::new(),
            vec![
                ReplacementRule::new("http://old", "https://new"),
                ReplacementRule::new("TODO", "Follow-up"),
            ],
        );
        let text = "http://old/x TODO http://old/y";

        let once = normalizer.normalize_body(text);
        assert_eq!(normalizer.normalize_body(&once), once);
    }

    #[test]
    fn overlapping_rules_are_not_idempotent() {
        // "a" -> "ab" reintroduces its own pattern on every pass.
        let normalizer = normalizer(Vec::new(), vec![ReplacementRule::new("a", "ab")]);

        let once = normalizer.normalize_body("a");
        assert_eq!(once, "ab");
        assert_eq!(normalizer.normalize_body(&once), "abb");
    }

    #[test]
    fn chained_rules_apply_sequentially() {
        let normalizer = normalizer(
            Vec::new(),
            vec![ReplacementRule::new("a", "b"), ReplacementRule::new("b", "c")],
        );
        assert_eq!(normalizer.normalize_body("ab"), "cc");
    }

    #[test]
    fn first_matching_login_rule_wins() {
        let normalizer = normalizer(
            vec![
                ReplacementRule::new("alice", "alice-one"),
                ReplacementRule::new("alice", "alice-two"),
            ],
            Vec::new(),
        );

        assert_eq!(normalizer.resolve_login("alice"), "alice-one");
        assert_eq!(normalizer.resolve_login("alicia"), "alicia");
    }
}
