//! The dashboard shown for a single alignment file.
//!
//! [`build`] is a pure function from the parsed reports (and a seed for the
//! illustrative charts) to a [`Dashboard`], which [`html::render`] turns into
//! a page. The dashboard is split into three views:
//!
//! - **Statistics**: the flagstat metrics in two columns plus the raw report.
//! - **Chromosomes**: the top references by mapped reads, the full table
//!   sorted by mapped reads, and a bar chart of the top references.
//! - **Visualizations**: the read-composition chart and the illustrative
//!   charts.
//!
//! Empty reports produce empty views, which render as placeholders.

pub mod charts;
pub mod composition;
pub mod html;
pub mod illustrative;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;
use tracing::warn;

use crate::reports::flagstat::AlignmentSummary;
use crate::reports::idxstats::ReferenceStat;
use crate::reports::idxstats::ReferenceTable;
use crate::reports::ParseDiagnostics;
use crate::reports::Parsed;

use self::charts::Chart;
use self::charts::Figure;
use self::composition::CategoryGroup;
use self::illustrative::get_all_illustrative_plots;

/// Number of references shown in the top references table and bar chart.
pub const TOP_REFERENCES: usize = 5;

/// A single flagstat metric as displayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metric {
    /// The metric description.
    pub description: String,

    /// The QC-passed count.
    pub count: u64,
}

/// The flagstat metrics and the raw report.
pub struct StatisticsView {
    /// The first half of the metrics.
    pub left: Vec<Metric>,

    /// The second half of the metrics.
    pub right: Vec<Metric>,

    /// The report exactly as samtools produced it.
    pub raw_report: String,

    /// What the flagstat parser skipped.
    pub diagnostics: ParseDiagnostics,
}

impl StatisticsView {
    /// Whether there are no metrics to show.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

/// The per-reference tables and chart.
pub struct ChromosomesView {
    /// The references with the most mapped reads, highest first.
    pub top: Vec<ReferenceStat>,

    /// All references, sorted by mapped reads, highest first.
    pub sorted: Vec<ReferenceStat>,

    /// Bar chart of the top references.
    pub chart: Option<Chart>,

    /// What the idxstats parser skipped.
    pub diagnostics: ParseDiagnostics,
}

/// The read-composition chart and the illustrative charts.
pub struct VisualizationsView {
    /// The metric groups behind the composition chart.
    pub groups: Vec<CategoryGroup>,

    /// The read-composition chart, if any metric could be categorized.
    pub composition: Option<Chart>,

    /// Charts drawn from simulated data.
    pub illustrative: Vec<Chart>,
}

/// Everything shown for one alignment file.
pub struct Dashboard {
    /// Name of the file the dashboard describes.
    pub source_name: String,

    /// The Statistics view.
    pub statistics: StatisticsView,

    /// The Chromosomes view.
    pub chromosomes: ChromosomesView,

    /// The Visualizations view.
    pub visualizations: VisualizationsView,
}

/// Splits the metrics into two halves for side-by-side display. The second
/// half gets the extra metric when the count is odd.
pub fn split_metrics(summary: &AlignmentSummary) -> (Vec<Metric>, Vec<Metric>) {
    let mut left = summary
        .iter()
        .map(|(description, count)| Metric {
            description: description.to_string(),
            count,
        })
        .collect::<Vec<_>>();

    let right = left.split_off(left.len() / 2);
    (left, right)
}

fn illustrative_charts(seed: u64) -> Vec<Chart> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut charts = Vec::new();

    for plot in get_all_illustrative_plots() {
        match plot.generate(&mut rng) {
            Ok(figure) => charts.push(Chart {
                id: plot.id(),
                title: String::from(plot.name()),
                illustrative: true,
                caption: Some(format!("{} {}", plot.description(), illustrative::CAPTION)),
                figure: Figure::Plotly(figure),
            }),
            Err(e) => warn!("could not generate {}: {}", plot.name(), e),
        }
    }

    charts
}

/// Builds the dashboard for one file.
pub fn build(
    source_name: &str,
    raw_flagstat: &str,
    summary: &Parsed<AlignmentSummary>,
    references: &Parsed<ReferenceTable>,
    seed: u64,
) -> Dashboard {
    debug!("building dashboard for {}", source_name);

    let (left, right) = split_metrics(&summary.value);
    let statistics = StatisticsView {
        left,
        right,
        raw_report: raw_flagstat.to_string(),
        diagnostics: summary.diagnostics.clone(),
    };

    let table = &references.value;
    let top = table.top_by_mapped(TOP_REFERENCES);
    let chart = match top.is_empty() {
        true => None,
        false => Some(charts::mapped_by_reference(&top)),
    };
    let chromosomes = ChromosomesView {
        top: top.into_iter().cloned().collect(),
        sorted: table.sorted_by_mapped().into_iter().cloned().collect(),
        chart,
        diagnostics: references.diagnostics.clone(),
    };

    let groups = composition::group(&summary.value);
    let composition = match groups.is_empty() {
        true => None,
        false => Some(charts::read_composition(&groups)),
    };
    let visualizations = VisualizationsView {
        groups,
        composition,
        illustrative: illustrative_charts(seed),
    };

    debug!(
        "  [*] {} metrics, {} references, {} composition categories",
        summary.value.len(),
        table.len(),
        visualizations.groups.len()
    );

    Dashboard {
        source_name: source_name.to_string(),
        statistics,
        chromosomes,
        visualizations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::flagstat;
    use crate::reports::idxstats;
    use crate::reports::ParsePolicy;

    const FLAGSTAT: &str = "\
1000 + 0 in total (QC-passed reads + QC-failed reads)
990 + 0 primary
950 + 0 mapped (95.00% : N/A)
900 + 0 properly paired (90.91% : N/A)
10 + 0 singletons (1.01% : N/A)
";

    const IDXSTATS: &str = "\
chr1\t1000\t500\t2
chr2\t1000\t100\t1
chr3\t1000\t300\t0
chr4\t1000\t50\t0
chr5\t1000\t250\t0
chr6\t1000\t400\t0
*\t0\t0\t7
";

    fn dashboard(flagstat_text: &str, idxstats_text: &str) -> Dashboard {
        let summary = flagstat::parse(flagstat_text, ParsePolicy::Permissive).unwrap();
        let references = idxstats::parse(idxstats_text, ParsePolicy::Permissive).unwrap();
        build("sample.bam", flagstat_text, &summary, &references, 42)
    }

    #[test]
    fn test_metrics_are_split_in_half() {
        let dashboard = dashboard(FLAGSTAT, IDXSTATS);
        let statistics = &dashboard.statistics;

        assert_eq!(statistics.left.len(), 2);
        assert_eq!(statistics.right.len(), 3);
        assert_eq!(statistics.left[0].description, "in total");
        assert_eq!(statistics.right[0].description, "mapped");
        assert_eq!(statistics.raw_report, FLAGSTAT);
    }

    #[test]
    fn test_reference_views() {
        let dashboard = dashboard(FLAGSTAT, IDXSTATS);
        let chromosomes = &dashboard.chromosomes;

        let top = chromosomes.top.iter().map(|r| r.name()).collect::<Vec<_>>();
        assert_eq!(top, vec!["chr1", "chr6", "chr3", "chr5", "chr2"]);
        assert_eq!(chromosomes.sorted.len(), 7);
        assert_eq!(chromosomes.sorted.last().unwrap().name(), "*");
        assert!(chromosomes.chart.is_some());
    }

    #[test]
    fn test_composition_groups() {
        let dashboard = dashboard(FLAGSTAT, IDXSTATS);
        let categories = dashboard
            .visualizations
            .groups
            .iter()
            .map(|g| g.category)
            .collect::<Vec<_>>();

        assert_eq!(
            categories,
            vec!["Total Reads", "Mapped Reads", "Properly Paired", "Singletons"]
        );
        assert!(dashboard.visualizations.composition.is_some());
    }

    #[test]
    fn test_illustrative_charts_are_labeled() {
        let dashboard = dashboard(FLAGSTAT, IDXSTATS);
        let illustrative = &dashboard.visualizations.illustrative;

        assert_eq!(illustrative.len(), 4);
        for chart in illustrative {
            assert!(chart.illustrative);
            assert!(chart
                .caption
                .as_deref()
                .unwrap()
                .contains("not computed from the uploaded file"));
        }
    }

    #[test]
    fn test_empty_reports_degrade_gracefully() {
        let dashboard = dashboard("", "");

        assert!(dashboard.statistics.is_empty());
        assert!(dashboard.chromosomes.top.is_empty());
        assert!(dashboard.chromosomes.chart.is_none());
        assert!(dashboard.visualizations.composition.is_none());
        assert_eq!(dashboard.visualizations.illustrative.len(), 4);
    }

    #[test]
    fn test_single_metric_goes_to_second_column() {
        let summary = flagstat::parse("5 + 0 mapped", ParsePolicy::Strict)
            .unwrap()
            .value;
        let (left, right) = split_metrics(&summary);
        assert!(left.is_empty());
        assert_eq!(right.len(), 1);
    }
}
