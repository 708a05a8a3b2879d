#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

mod client;
pub mod config;
pub mod destination;
pub mod import;
pub mod normalizer;
pub mod payload;
pub mod rate_limit;
pub mod records;
pub mod runner;
pub mod sequencer;
pub mod source;
pub mod summary;
pub mod templates;

pub use config::{ConfigError, ReplacementRule, ReplacementRules, RepositoryId};
pub use destination::{
    Destination, DestinationError, DryRunDestination, GitHubDestination, ImportErrorDetail,
    ImportReceipt, ImportStatus,
};
pub use import::{
    BackoffPolicy, CreationStrategy, DirectCreateStrategy, ImportAttempt, ImportError,
    ImportStrategy, Sleeper, SubmitOutcome, TokioSleeper,
};
pub use normalizer::TextNormalizer;
pub use payload::{CreationPayload, PayloadComment, RequestBuilder};
pub use rate_limit::{check_core_rate_limit, RateLimitGuard, RateLimitInfo};
pub use records::{Author, Comment, Label, Milestone, Record, RecordKind};
pub use runner::{AssigneeMatch, CreationMode, RunFlags, Runner, RunnerConfig, TransferError};
pub use sequencer::{SequenceError, Sequencer, Slot};
pub use source::{GitHubSource, RecordSource, SourceError};
pub use summary::RunSummary;
pub use templates::{HeaderOptions, HeaderRenderer, TemplateError};
