//! Author header rendering using Handlebars.
//!
//! Migrated issues and comments are posted by the migrating account, so each
//! body starts with a small header naming the original author.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, HeaderRenderer};

/// Controls what goes into an author header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderOptions {
    /// Leave out the avatar image.
    pub skip_avatars: bool,

    /// Append the original creation time. Needed when the destination
    /// stamps records with the time of migration.
    pub include_timestamp: bool,
}
