//! CLI for issue-transfer.
//!
//! Replays the issues, pull requests, labels and milestones of one GitHub
//! repository onto another so every record keeps its original number.

use clap::{Parser, ValueEnum};
use issue_transfer::config::{parse_endpoint, DEFAULT_ENDPOINT};
use issue_transfer::runner::DEFAULT_REPLACE_PATH;
use issue_transfer::{
    CreationMode, RepositoryId, RunFlags, RunSummary, Runner, RunnerConfig, TransferError,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How issues are created on the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Bulk import API; keeps original timestamps.
    Import,
    /// Regular issue API; timestamps go into the author header.
    Direct,
}

/// Issue Transfer - Move issues and pull requests between GitHub repositories, keeping their numbers.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Origin repository (owner/name).
    #[arg(long)]
    src: String,

    /// Destination repository (owner/name).
    #[arg(long)]
    dst: String,

    /// Origin REST API endpoint, e.g. `https://ghe.example.com/api/v3`.
    /// GraphQL queries go to the matching `/api/graphql`.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    src_endpoint: String,

    /// Destination REST API endpoint.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    dst_endpoint: String,

    /// Token for the origin.
    #[arg(long, env = "SRC_TOKEN", hide_env_values = true)]
    src_token: Option<String>,

    /// Token for the destination.
    #[arg(long, env = "DST_TOKEN", hide_env_values = true)]
    dst_token: Option<String>,

    /// Creation strategy.
    #[arg(long, value_enum, default_value_t = Strategy::Import)]
    strategy: Strategy,

    /// Do not wait for imports to finish. Refused when numbers have gaps.
    #[arg(long)]
    fire_and_forget: bool,

    /// Do not transfer labels.
    #[arg(long)]
    skip_labels: bool,

    /// Do not transfer milestones.
    #[arg(long)]
    skip_milestones: bool,

    /// Leave avatars out of author headers.
    #[arg(long)]
    skip_avatars: bool,

    /// Log destination writes instead of performing them.
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,

    /// Replacement rule file (TOML or YAML).
    #[arg(long, default_value = DEFAULT_REPLACE_PATH)]
    replace_path: PathBuf,

    /// Print origin assignees that exist on the destination and exit.
    #[arg(long)]
    show_assignees: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_tracing(args.debug);

    match run(args).await {
        Ok(Some(summary)) => {
            print_summary(&summary);

            if summary.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Ok(None) => ExitCode::from(0),
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// `RUST_LOG` takes precedence; otherwise the level is `info`, or `debug`
/// when requested on the command line.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

fn build_config(args: &Args) -> Result<RunnerConfig, TransferError> {
    let mode = match (args.strategy, args.fire_and_forget) {
        (Strategy::Direct, _) => CreationMode::DirectCreate,
        (Strategy::Import, true) => CreationMode::ImportFireAndForget,
        (Strategy::Import, false) => CreationMode::ImportSync,
    };

    let config = RunnerConfig::new(
        RepositoryId::parse(&args.src)?,
        RepositoryId::parse(&args.dst)?,
        mode,
    )
    .with_source_access(parse_endpoint(&args.src_endpoint)?, args.src_token.clone())
    .with_destination_access(parse_endpoint(&args.dst_endpoint)?, args.dst_token.clone())
    .with_flags(RunFlags {
        skip_labels: args.skip_labels,
        skip_milestones: args.skip_milestones,
        skip_avatars: args.skip_avatars,
        dry_run: args.dry_run,
    })
    .with_replace_path(args.replace_path.clone());

    Ok(config)
}

/// Main execution logic. Returns `None` when only assignees were listed.
async fn run(args: Args) -> Result<Option<RunSummary>, TransferError> {
    let runner = Runner::new(build_config(&args)?)?;

    if args.show_assignees {
        for assignee in runner.show_assignees().await? {
            println!("{} {}", assignee.number, assignee.login);
        }
        return Ok(None);
    }

    runner.run().await.map(Some)
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Labels created: {}", summary.labels_created);
    println!("  Milestones created: {}", summary.milestones_created);
    println!("  Issues: {}", summary.issues);
    println!("  Pull requests: {}", summary.pull_requests);
    println!("  Placeholders: {}", summary.placeholders);

    if !summary.pending_imports.is_empty() {
        println!("  Imports not awaited: {}", summary.pending_imports.len());
    }
    if summary.comments_dropped > 0 {
        println!("  Comments dropped: {}", summary.comments_dropped);
    }
}
