//! Charts derived from the parsed reports.

use itertools::Itertools;
use plotly::common::Title;
use plotly::layout::Axis;
use plotly::Bar;
use plotly::Layout;
use serde_json::json;

use crate::dashboard::composition::CategoryGroup;
use crate::reports::idxstats::ReferenceStat;

/// Title of the read-composition chart.
pub const READ_COMPOSITION_TITLE: &str = "Read Composition from Flagstats";

/// Title of the mapped reads bar chart.
pub const MAPPED_BY_REFERENCE_TITLE: &str = "Mapped Reads by Chromosome";

/// The drawing instructions for a chart.
pub enum Figure {
    /// A figure built with the `plotly` crate.
    Plotly(plotly::Plot),

    /// A raw plotly.js figure (`{"data": [...], "layout": {...}}`), for trace
    /// types the `plotly` crate does not provide.
    Json(serde_json::Value),
}

/// A chart ready to be placed on the dashboard.
pub struct Chart {
    /// Identifier of the element the chart is drawn in.
    pub id: &'static str,

    /// Human-readable title.
    pub title: String,

    /// Whether the chart is drawn from simulated data rather than the upload.
    pub illustrative: bool,

    /// Text shown underneath the chart.
    pub caption: Option<String>,

    /// What to draw.
    pub figure: Figure,
}

/// Bar chart of mapped read counts for the given references.
pub fn mapped_by_reference(rows: &[&ReferenceStat]) -> Chart {
    let x = rows.iter().map(|r| r.name().to_string()).collect_vec();
    let y = rows.iter().map(|r| r.mapped()).collect_vec();

    let mut plot = plotly::Plot::new();
    plot.add_trace(Bar::new(x, y).name("Mapped"));

    let layout = Layout::new()
        .title(Title::new(MAPPED_BY_REFERENCE_TITLE))
        .show_legend(false)
        .x_axis(Axis::new().title(Title::new("Chromosome")))
        .y_axis(Axis::new().title(Title::new("Mapped")));
    plot.set_layout(layout);

    Chart {
        id: "mapped-by-chromosome",
        title: String::from(MAPPED_BY_REFERENCE_TITLE),
        illustrative: false,
        caption: None,
        figure: Figure::Plotly(plot),
    }
}

/// Donut chart of the read-composition categories.
pub fn read_composition(groups: &[CategoryGroup]) -> Chart {
    let labels = groups.iter().map(|g| g.category).collect_vec();
    let values = groups.iter().map(|g| g.total()).collect_vec();

    let figure = json!({
        "data": [{
            "type": "pie",
            "labels": labels,
            "values": values,
            "hole": 0.3,
            "textposition": "inside",
            "textinfo": "percent+label",
        }],
        "layout": {
            "title": { "text": READ_COMPOSITION_TITLE },
        },
    });

    Chart {
        id: "read-composition",
        title: String::from(READ_COMPOSITION_TITLE),
        illustrative: false,
        caption: Some(String::from(
            "Categories overlap (e.g. mapped reads are also counted in the total), so slices are relative sizes only.",
        )),
        figure: Figure::Json(figure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::composition::CategorizedMetric;

    #[test]
    fn test_read_composition_figure() {
        let groups = vec![
            CategoryGroup {
                category: "Total Reads",
                metrics: vec![CategorizedMetric {
                    description: String::from("in total"),
                    count: 1000,
                }],
            },
            CategoryGroup {
                category: "Duplicates",
                metrics: vec![
                    CategorizedMetric {
                        description: String::from("duplicates"),
                        count: 25,
                    },
                    CategorizedMetric {
                        description: String::from("primary duplicates"),
                        count: 20,
                    },
                ],
            },
        ];

        let chart = read_composition(&groups);
        assert!(!chart.illustrative);

        match chart.figure {
            Figure::Json(value) => {
                let trace = &value["data"][0];
                assert_eq!(trace["type"], "pie");
                assert_eq!(trace["labels"], json!(["Total Reads", "Duplicates"]));
                assert_eq!(trace["values"], json!([1000, 45]));
                assert_eq!(value["layout"]["title"]["text"], READ_COMPOSITION_TITLE);
            }
            Figure::Plotly(_) => panic!("expected a raw figure"),
        }
    }

    #[test]
    fn test_mapped_by_reference_is_derived() {
        let rows = vec![
            ReferenceStat::new("chr1", 1000, 50, 0),
            ReferenceStat::new("chr2", 1000, 40, 0),
        ];
        let refs = rows.iter().collect_vec();

        let chart = mapped_by_reference(&refs);
        assert_eq!(chart.id, "mapped-by-chromosome");
        assert!(!chart.illustrative);
        assert!(matches!(chart.figure, Figure::Plotly(_)));
    }
}
