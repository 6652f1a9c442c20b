//! loanfile: command-line driver for submission field reconciliation.
//!
//! Loads a JSON store snapshot (field schema, submissions and their
//! documents), recomputes or applies manual edits, prints the outcome and
//! optionally writes the snapshot back.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use commands::{summary_line, Session, TriggerArg};
use loanfile_core::{RecomputeOutcome, ReconcileConfig};

#[derive(Parser)]
#[command(name = "loanfile")]
#[command(author, version, about = "Reconcile extracted loan submission fields")]
#[command(propagate_version = true)]
struct Cli {
    /// Print one summary line per submission instead of JSON
    #[arg(long, global = true)]
    summary: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute resolved fields and eligibility
    Recompute {
        /// Store snapshot file
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Only this submission (default: every submission)
        #[arg(long)]
        submission: Option<Uuid>,

        /// Lifecycle event to report the recompute as
        #[arg(long, value_enum, default_value_t = TriggerArg::Explicit)]
        trigger: TriggerArg,

        /// Write the updated store back to the snapshot file
        #[arg(short, long)]
        write: bool,
    },

    /// Apply a batch of manual edits, then recompute
    Edit {
        /// Store snapshot file
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Submission to edit
        #[arg(long)]
        submission: Uuid,

        /// JSON file with `set`, `review` and `clear_manual` lists
        #[arg(short, long)]
        edits: PathBuf,

        /// Reviewer performing the edits
        #[arg(short, long)]
        actor: String,

        /// Write the updated store back to the snapshot file
        #[arg(short, long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ReconcileConfig::from_env();
    match cli.command {
        Commands::Recompute {
            snapshot,
            submission,
            trigger,
            write,
        } => {
            let session = Session::open(&snapshot, config).await?;
            let outcomes = session.recompute(submission, trigger).await?;
            print_outcomes(&outcomes, cli.summary)?;
            if write {
                session.save().await?;
            }
        }
        Commands::Edit {
            snapshot,
            submission,
            edits,
            actor,
            write,
        } => {
            let session = Session::open(&snapshot, config).await?;
            let outcome = session.edit(submission, &edits, &actor).await?;
            print_outcomes(std::slice::from_ref(&outcome), cli.summary)?;
            if write {
                session.save().await?;
            }
        }
    }
    Ok(())
}

fn print_outcomes(outcomes: &[RecomputeOutcome], summary: bool) -> anyhow::Result<()> {
    if summary {
        for outcome in outcomes {
            println!("{}", summary_line(outcome));
        }
    } else {
        println!("{}", serde_json::to_string_pretty(outcomes)?);
    }
    Ok(())
}

/// Initialize tracing with configurable output.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors
///   RUST_LOG    - standard env filter (default: "loanfile=info,loanfile_reconcile=info")
///
/// Console logs go to stderr so stdout stays parseable.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "loanfile=info,loanfile_reconcile=info,loanfile_store=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let path = std::path::Path::new(path);
        let file_dir = path.parent().unwrap_or(std::path::Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("loanfile.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false)); // no ANSI in files
            registry.with(layer).init();
        }
        Some(guard)
    } else if log_format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
        None
    } else {
        let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        if let Some(ansi) = log_ansi {
            layer = layer.with_ansi(ansi);
        }
        registry.with(layer).init();
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );
    guard
}
