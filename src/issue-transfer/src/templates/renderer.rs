//! Author header renderer.

use super::{HeaderOptions, TemplateError};
use crate::records::Author;
use chrono::{DateTime, Utc};
use handlebars::{no_escape, Handlebars};
use serde_json::json;

/// Header placed in front of every migrated body.
const AUTHOR_HEADER_TEMPLATE: &str = "{{#unless skip_avatar}}<img src=\"{{avatar_url}}\" width=\"25\"> {{/unless}}<b>{{login}}</b> commented{{#if timestamp}} ({{timestamp}}){{/if}}:\n\n";

/// RFC 822 layout, e.g. `02 Jan 06 15:04 UTC`.
const RFC822_FORMAT: &str = "%d %b %y %H:%M %Z";

/// Creates a configured Handlebars registry.
///
/// The registry is configured with:
/// - No HTML escaping (bodies are markdown and already contain HTML)
/// - Strict mode (catches missing variables)
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs
}

/// Renders author headers for issue and comment bodies.
pub struct HeaderRenderer {
    handlebars: Handlebars<'static>,
    options: HeaderOptions,
}

impl HeaderRenderer {
    /// Creates a renderer with the given options.
    #[must_use]
    pub fn new(options: HeaderOptions) -> Self {
        Self {
            handlebars: create_handlebars_registry(),
            options,
        }
    }

    /// Returns the options this renderer was built with.
    #[must_use]
    pub fn options(&self) -> HeaderOptions {
        self.options
    }

    /// Renders the header for `author`, written at `created_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render(&self, author: &Author, created_at: DateTime<Utc>) -> Result<String, TemplateError> {
        let timestamp = if self.options.include_timestamp {
            created_at.format(RFC822_FORMAT).to_string()
        } else {
            String::new()
        };

        let data = json!({
            "skip_avatar": self.options.skip_avatars,
            "avatar_url": author.avatar_url,
            "login": author.login,
            "timestamp": timestamp,
        });

        Ok(self
            .handlebars
            .render_template(AUTHOR_HEADER_TEMPLATE, &data)?)
    }
}
