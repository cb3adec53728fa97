//! Parsing of the per-reference report produced by `samtools idxstats`.
//!
//! Each line is tab-separated: reference name, sequence length, mapped read
//! count and (optionally) unmapped read count.

use itertools::Itertools;
use serde::Serialize;

use crate::errors::Error;
use crate::errors::ReportKind;
use crate::reports::numbered_lines;
use crate::reports::ParseDiagnostics;
use crate::reports::ParsePolicy;
use crate::reports::Parsed;

/// Read counts for a single reference sequence.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReferenceStat {
    name: String,
    length: u64,
    mapped: u64,
    unmapped: u64,
    coverage: Option<f64>,
}

impl ReferenceStat {
    /// Creates a new row, deriving the coverage from the mapped count and length.
    pub fn new(name: impl Into<String>, length: u64, mapped: u64, unmapped: u64) -> Self {
        let coverage = match length {
            0 => None,
            _ => Some(mapped as f64 / length as f64),
        };

        Self {
            name: name.into(),
            length,
            mapped,
            unmapped,
            coverage,
        }
    }

    /// Name of the reference sequence.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length of the reference sequence.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Number of reads mapped to the reference sequence.
    pub fn mapped(&self) -> u64 {
        self.mapped
    }

    /// Number of unmapped reads placed on the reference sequence.
    pub fn unmapped(&self) -> u64 {
        self.unmapped
    }

    /// Mapped reads per base, or `None` when the length is zero.
    pub fn coverage(&self) -> Option<f64> {
        self.coverage
    }
}

/// All rows of an idxstats report in report order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReferenceTable {
    rows: Vec<ReferenceStat>,
}

impl ReferenceTable {
    /// The rows in report order.
    pub fn rows(&self) -> &[ReferenceStat] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows sorted by mapped count, highest first. Ties keep report order.
    pub fn sorted_by_mapped(&self) -> Vec<&ReferenceStat> {
        self.rows
            .iter()
            .sorted_by(|a, b| b.mapped.cmp(&a.mapped))
            .collect_vec()
    }

    /// The `n` rows with the highest mapped counts, highest first.
    pub fn top_by_mapped(&self, n: usize) -> Vec<&ReferenceStat> {
        self.sorted_by_mapped().into_iter().take(n).collect_vec()
    }
}

impl FromIterator<ReferenceStat> for ReferenceTable {
    fn from_iter<I: IntoIterator<Item = ReferenceStat>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

fn parse_field(value: &str, field: &str, line_number: usize, line: &str) -> Result<u64, Error> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| Error::MalformedReport {
            report: ReportKind::Idxstats,
            line_number,
            line: line.to_string(),
            reason: format!("invalid {} {:?}: {}", field, value, e),
        })
}

/// Parses the text of a `samtools idxstats` report.
///
/// Lines with fewer than three fields are handled according to `policy`.
/// A missing fourth field means zero unmapped reads. A numeric field that is
/// not an integer is always an error.
pub fn parse(text: &str, policy: ParsePolicy) -> Result<Parsed<ReferenceTable>, Error> {
    let mut rows = Vec::new();
    let mut diagnostics = ParseDiagnostics::default();

    for (line_number, line) in numbered_lines(text) {
        diagnostics.lines_read += 1;

        let fields = line.split('\t').collect_vec();
        if fields.len() < 3 {
            diagnostics.reject(
                policy,
                ReportKind::Idxstats,
                line_number,
                line,
                "fewer than three tab-separated fields",
            )?;
            continue;
        }

        let length = parse_field(fields[1], "length", line_number, line)?;
        let mapped = parse_field(fields[2], "mapped count", line_number, line)?;
        let unmapped = match fields.get(3) {
            Some(value) => parse_field(value, "unmapped count", line_number, line)?,
            None => 0,
        };

        rows.push(ReferenceStat::new(fields[0], length, mapped, unmapped));
    }

    diagnostics.log(ReportKind::Idxstats);

    Ok(Parsed {
        value: ReferenceTable { rows },
        diagnostics,
    })
}
