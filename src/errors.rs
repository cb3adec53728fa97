//! Errors that can occur while producing a dashboard for a single upload.

use std::fmt;
use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// The step of the external tool pipeline that an invocation belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolStep {
    /// `samtools index`.
    Index,

    /// `samtools flagstat`.
    Flagstat,

    /// `samtools idxstats`.
    Idxstats,
}

impl ToolStep {
    /// The samtools subcommand that implements this step.
    pub fn subcommand(&self) -> &'static str {
        match self {
            ToolStep::Index => "index",
            ToolStep::Flagstat => "flagstat",
            ToolStep::Idxstats => "idxstats",
        }
    }
}

impl fmt::Display for ToolStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "samtools {}", self.subcommand())
    }
}

/// The report that a parse error originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    /// The summary report produced by `samtools flagstat`.
    Flagstat,

    /// The per-reference report produced by `samtools idxstats`.
    Idxstats,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Flagstat => write!(f, "flagstat report"),
            ReportKind::Idxstats => write!(f, "idxstats report"),
        }
    }
}

/// All of the ways producing a dashboard can fail.
#[derive(Debug, Error)]
pub enum Error {
    /// The external tool could not be started, failed, or produced nothing usable.
    #[error("{step} failed ({status}): {stderr}")]
    ToolExecution {
        /// The step that failed.
        step: ToolStep,
        /// A description of the exit status (or why the process never ran).
        status: String,
        /// The diagnostic output captured from the tool.
        stderr: String,
    },

    /// The external tool did not finish within the bounded wait.
    #[error("{step} did not finish within {seconds} seconds")]
    ToolTimeout {
        /// The step that timed out.
        step: ToolStep,
        /// The configured bound.
        seconds: u64,
    },

    /// A report line could not be parsed.
    #[error("malformed {report} at line {line_number} ({reason}): {line:?}")]
    MalformedReport {
        /// The report being parsed.
        report: ReportKind,
        /// One-based line number within the report.
        line_number: usize,
        /// The offending line.
        line: String,
        /// What was wrong with it.
        reason: String,
    },

    /// No file was provided.
    #[error("no alignment file was provided")]
    EmptyInput,

    /// Reading or writing the request's temporary storage failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Builds a [`Error::ToolExecution`] from a finished process.
    pub fn tool_failed(step: ToolStep, status: ExitStatus, stderr: &[u8]) -> Self {
        let status = match status.code() {
            Some(code) => format!("exit code {}", code),
            None => String::from("terminated by signal"),
        };

        Error::ToolExecution {
            step,
            status,
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }

    /// Whether the user should simply be prompted again rather than shown a failure.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Error::EmptyInput)
    }
}
