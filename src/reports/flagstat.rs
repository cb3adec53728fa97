//! Parsing of the summary report produced by `samtools flagstat`.
//!
//! Each line of the report has the shape
//!
//! ```text
//! <QC-passed> + <QC-failed> <description>[ (<annotation>)]
//! ```
//!
//! Only the QC-passed count and the description are retained. For example,
//! `1000 + 0 in total (QC-passed reads + QC-failed reads)` becomes the entry
//! `in total → 1000`.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::errors::Error;
use crate::errors::ReportKind;
use crate::reports::numbered_lines;
use crate::reports::ParseDiagnostics;
use crate::reports::ParsePolicy;
use crate::reports::Parsed;
use crate::reports::SkippedLine;

/// Metric counts from a flagstat report, keyed by description in the order
/// the metrics were encountered. Each description appears at most once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AlignmentSummary {
    metrics: IndexMap<String, u64>,
}

impl AlignmentSummary {
    /// Gets the count for a metric by its description.
    pub fn get(&self, description: &str) -> Option<u64> {
        self.metrics.get(description).copied()
    }

    /// Iterates over `(description, count)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.metrics.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of distinct metrics.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Whether no metrics were parsed.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

/// Splits a report line into the QC-passed count (unparsed) and the description.
///
/// Returns `None` when the line carries no `+` separator.
fn split_line(line: &str) -> Option<(&str, &str)> {
    let (count, rest) = line.split_once('+')?;

    let rest = match rest.find('(') {
        Some(i) => &rest[..i],
        None => rest,
    };

    // The QC-failed count leads the remainder.
    let rest = rest.trim();
    let description = match rest.split_once(char::is_whitespace) {
        Some((failed, description)) if failed.chars().all(|c| c.is_ascii_digit()) => description,
        _ if rest.chars().all(|c| c.is_ascii_digit()) => "",
        _ => rest,
    };

    Some((count.trim(), description.trim()))
}

/// Parses the text of a `samtools flagstat` report.
///
/// Lines without a `+` separator (or without a description) are handled
/// according to `policy`. A count that is not an integer is always an
/// error. When a description repeats, the first count is kept and the
/// repeat is recorded as a skipped line.
pub fn parse(text: &str, policy: ParsePolicy) -> Result<Parsed<AlignmentSummary>, Error> {
    let mut summary = AlignmentSummary::default();
    let mut diagnostics = ParseDiagnostics::default();

    for (line_number, line) in numbered_lines(text) {
        diagnostics.lines_read += 1;

        let (count, description) = match split_line(line) {
            Some(parts) => parts,
            None => {
                diagnostics.reject(
                    policy,
                    ReportKind::Flagstat,
                    line_number,
                    line,
                    "no '+' separator",
                )?;
                continue;
            }
        };

        let count = count.parse::<u64>().map_err(|e| Error::MalformedReport {
            report: ReportKind::Flagstat,
            line_number,
            line: line.to_string(),
            reason: format!("invalid count {:?}: {}", count, e),
        })?;

        if description.is_empty() {
            diagnostics.reject(
                policy,
                ReportKind::Flagstat,
                line_number,
                line,
                "missing description",
            )?;
            continue;
        }

        if summary.metrics.contains_key(description) {
            debug!(
                "  [*] Keeping first value for repeated metric {:?} (line {})",
                description, line_number
            );
            diagnostics.skipped_lines.push(SkippedLine {
                line_number,
                line: line.to_string(),
            });
            continue;
        }

        summary.metrics.insert(description.to_string(), count);
    }

    diagnostics.log(ReportKind::Flagstat);

    Ok(Parsed {
        value: summary,
        diagnostics,
    })
}
