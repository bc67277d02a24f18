//! Lint engine: runs an external static-analysis tool and turns its report
//! into per-file diagnostics.

pub mod classify;
pub mod paths;
pub mod report;
pub mod types;

pub(crate) mod diagnostics;
pub(crate) mod options;
pub(crate) mod project;

mod batch;
mod cancel;
mod error;
mod invocation;
mod linter;
mod output;

#[cfg(test)]
mod test_support;

pub use batch::{BatchState, progress_step};
pub use cancel::CancellationToken;
pub use diagnostics::DiagnosticsStore;
pub use error::{ConfigError, LintError};
pub use invocation::{Invoke, ProcessInvoker, RawOutput};
pub use linter::Linter;
pub use options::{CONFIG_SUBDIR, OptionFile, resolve_config_file};
pub use output::{BufferedOutput, OutputSink, TracingOutput};
pub use project::harvest_include_paths;
pub use types::{
    BatchSummary, ClassifierSettings, DiagnosticsSnapshot, InvocationConfig, LintOutcome,
    Progress, SaveTrigger,
};
