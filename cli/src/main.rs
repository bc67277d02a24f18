//! lintrun CLI - runs the analysis tool over files and prints diagnostics.
//!
//! ```text
//! lintrun check src/main.c
//! lintrun batch src --glob '**/*.c'
//! lintrun config
//! ```
//!
//! Narration from the engine goes to the log (stderr, or `--log-file`).
//! Diagnostics go to stdout. Exit status is 1 when any error-severity
//! diagnostic was produced and 130 when a batch was interrupted.

mod discover;
mod render;

use std::env;
use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lintrun_config::LintrunConfig;
use lintrun_lint::{
    CancellationToken, ClassifierSettings, DiagnosticsSnapshot, InvocationConfig, Linter,
    Progress, SaveTrigger, TracingOutput, paths,
};
use tokio::signal;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::discover::FileFilter;
use crate::render::{OutputFormat, RunResult};

const EXIT_ERRORS: u8 = 1;
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(name = "lintrun", version)]
#[command(about = "Run a static-analysis tool and report per-file diagnostics")]
struct Cli {
    /// Config file (default: <root>/lintrun.toml, then ~/.lintrun/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Repository root; overrides the configured one
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Diagnostics output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint a single file
    Check {
        /// Source file to lint
        file: PathBuf,
    },
    /// Lint many files, one tool invocation per file
    Batch {
        /// Files or directories (default: the repository root)
        paths: Vec<PathBuf>,
        /// Only lint files matching this glob (repeatable)
        #[arg(long = "glob")]
        globs: Vec<String>,
    },
    /// Print the effective configuration
    Config,
}

/// Settings resolved from the config file and command line.
struct Session {
    cwd: PathBuf,
    config_path: Option<PathBuf>,
    invocation: InvocationConfig,
    settings: ClassifierSettings,
    trigger: SaveTrigger,
}

impl Session {
    fn load(cli: &Cli) -> Result<Self> {
        let cwd = env::current_dir().context("reading the current directory")?;
        let search_root = cli
            .root
            .as_deref()
            .map_or_else(|| cwd.clone(), |root| paths::normalize(root, &cwd));
        let loaded = LintrunConfig::load(cli.config.as_deref(), &search_root)
            .context("loading configuration")?;

        let mut invocation = loaded.config.invocation_config(&loaded.base_dir(&search_root));
        if cli.root.is_some() {
            invocation.repository_root = Some(search_root);
        }

        Ok(Self {
            cwd,
            settings: loaded.config.classifier_settings(),
            trigger: loaded.config.save_trigger(),
            config_path: loaded.path,
            invocation,
        })
    }
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();
        tracing::debug!(path = %path.display(), "Logging initialized");
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .without_time()
                .with_ansi(io::stderr().is_terminal())
                .with_writer(io::stderr),
        )
        .with(env_filter)
        .init();
    Ok(())
}

fn exit_for(snapshot: &DiagnosticsSnapshot) -> ExitCode {
    if snapshot.error_count() > 0 {
        ExitCode::from(EXIT_ERRORS)
    } else {
        ExitCode::SUCCESS
    }
}

async fn check(cli: &Cli, session: Session, file: &Path) -> Result<ExitCode> {
    let file = paths::normalize(file, &session.cwd);
    let mut linter = Linter::new(session.settings, Arc::new(TracingOutput));
    let outcome = linter
        .lint_one(&file, &session.invocation)
        .await
        .with_context(|| format!("linting {}", file.display()))?;

    let snapshot = linter.snapshot();
    print!(
        "{}",
        render::render(cli.format, &snapshot, RunResult::Single(&outcome), &session.cwd)?
    );
    Ok(exit_for(&snapshot))
}

async fn batch(cli: &Cli, session: Session, inputs: &[PathBuf], globs: &[String]) -> Result<ExitCode> {
    let root = session
        .invocation
        .working_dir()
        .context("resolving the repository root")?;
    let filter = FileFilter::new(globs, &session.trigger.file_extensions)?;
    let files = discover::discover(inputs, &session.cwd, &root, &filter);
    if files.is_empty() {
        tracing::warn!(root = %root.display(), "No files to lint");
    }

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current file");
            interrupt.cancel();
        }
    });

    let mut on_progress = |progress: Progress| {
        tracing::info!(
            processed = progress.processed,
            total = progress.total,
            "{}% done",
            progress.percent()
        );
    };

    let mut linter = Linter::new(session.settings, Arc::new(TracingOutput));
    let result = linter
        .lint_many(&files, &session.invocation, Some(&mut on_progress), Some(&token))
        .await;

    let snapshot = linter.snapshot();
    match result {
        Ok(summary) => {
            print!(
                "{}",
                render::render(cli.format, &snapshot, RunResult::Batch(&summary), &session.cwd)?
            );
            Ok(exit_for(&snapshot))
        }
        Err(e) if e.is_cancelled() => {
            tracing::warn!("{e}");
            print!(
                "{}",
                render::render(cli.format, &snapshot, RunResult::Cancelled, &session.cwd)?
            );
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
        Err(e) => Err(e).context("batch lint failed"),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let session = Session::load(&cli)?;
    match &cli.command {
        Commands::Check { file } => check(&cli, session, file).await,
        Commands::Batch { paths, globs } => batch(&cli, session, paths, globs).await,
        Commands::Config => {
            print!(
                "{}",
                render::config(
                    cli.format,
                    &session.invocation,
                    session.config_path.as_deref()
                )?
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}
