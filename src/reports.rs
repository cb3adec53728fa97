//! Parsers for the plain-text reports produced by `samtools`.
//!
//! Both reports are line oriented and both tolerate lines that do not have
//! the expected shape. Whether such lines are skipped or rejected is decided
//! by the [`ParsePolicy`], and every skipped line is recorded in the
//! [`ParseDiagnostics`] returned alongside the parsed records.

pub mod flagstat;
pub mod idxstats;

use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::errors::Error;
use crate::errors::ReportKind;

/// How a parser treats lines that do not have the expected shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Skip the line and record it in the diagnostics.
    #[default]
    Permissive,

    /// Fail with [`Error::MalformedReport`].
    Strict,
}

/// The records produced by a parser together with the diagnostics for the parse.
#[derive(Clone, Debug)]
pub struct Parsed<T> {
    /// The parsed records.
    pub value: T,

    /// What the parser skipped along the way.
    pub diagnostics: ParseDiagnostics,
}

/// A line that a parser chose not to interpret.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    /// One-based line number within the report.
    pub line_number: usize,

    /// The line itself.
    pub line: String,
}

/// Bookkeeping about a single report parse.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostics {
    /// Number of non-blank lines examined.
    pub lines_read: usize,

    /// Non-blank lines that were not turned into records.
    pub skipped_lines: Vec<SkippedLine>,
}

impl ParseDiagnostics {
    /// Number of lines that were skipped.
    pub fn skipped(&self) -> usize {
        self.skipped_lines.len()
    }

    /// Applies the policy to a line that has the wrong shape.
    pub(crate) fn reject(
        &mut self,
        policy: ParsePolicy,
        report: ReportKind,
        line_number: usize,
        line: &str,
        reason: &str,
    ) -> Result<(), Error> {
        match policy {
            ParsePolicy::Permissive => {
                debug!("  [*] Skipping line {} of {}: {}", line_number, report, reason);
                self.skipped_lines.push(SkippedLine {
                    line_number,
                    line: line.to_string(),
                });
                Ok(())
            }
            ParsePolicy::Strict => Err(Error::MalformedReport {
                report,
                line_number,
                line: line.to_string(),
                reason: reason.to_string(),
            }),
        }
    }

    /// Logs a summary of the parse.
    pub(crate) fn log(&self, report: ReportKind) {
        if self.skipped() > 0 {
            warn!(
                "skipped {} of {} lines in the {}",
                self.skipped(),
                self.lines_read,
                report
            );
        } else {
            debug!("  [*] Parsed all {} lines in the {}", self.lines_read, report);
        }
    }
}

/// Iterates over the non-blank lines of a report with one-based line numbers.
pub(crate) fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_lines_skips_blanks_but_keeps_numbering() {
        let lines = numbered_lines("a\n\n  \nb\n").collect::<Vec<_>>();
        assert_eq!(lines, vec![(1, "a"), (4, "b")]);
    }

    #[test]
    fn test_permissive_reject_records_line() {
        let mut diagnostics = ParseDiagnostics::default();
        diagnostics
            .reject(
                ParsePolicy::Permissive,
                ReportKind::Idxstats,
                2,
                "chr1",
                "too few fields",
            )
            .unwrap();

        assert_eq!(diagnostics.skipped(), 1);
        assert_eq!(diagnostics.skipped_lines[0].line_number, 2);
        assert_eq!(diagnostics.skipped_lines[0].line, "chr1");
    }

    #[test]
    fn test_strict_reject_fails() {
        let mut diagnostics = ParseDiagnostics::default();
        let err = diagnostics
            .reject(
                ParsePolicy::Strict,
                ReportKind::Flagstat,
                7,
                "annotation",
                "no '+' separator",
            )
            .unwrap_err();

        assert!(matches!(
            err,
            Error::MalformedReport { line_number: 7, .. }
        ));
        assert_eq!(diagnostics.skipped(), 0);
    }
}
