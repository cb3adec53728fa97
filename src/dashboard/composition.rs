//! Grouping of flagstat metrics into read-composition categories.
//!
//! Each metric is assigned to the category of the first [`CompositionRule`]
//! (in [`RULES`] order) whose phrase occurs in the metric's description,
//! ignoring case. Metrics that match no rule are left out of the composition
//! but remain visible in the statistics view.

use serde::Serialize;

use crate::reports::flagstat::AlignmentSummary;

/// Assigns metrics whose description contains `phrase` to `category`.
#[derive(Debug)]
pub struct CompositionRule {
    /// Lowercase phrase searched for in the metric description.
    pub phrase: &'static str,

    /// Human-readable category name.
    pub category: &'static str,
}

impl CompositionRule {
    /// Whether this rule applies to a metric description.
    pub fn matches(&self, description: &str) -> bool {
        description.to_lowercase().contains(self.phrase)
    }
}

/// The rules in priority order; the first rule whose phrase matches wins.
/// "mapped" precedes the mate-mapping phrases, so those metrics count as
/// mapped reads.
pub const RULES: &[CompositionRule] = &[
    CompositionRule {
        phrase: "in total",
        category: "Total Reads",
    },
    CompositionRule {
        phrase: "secondary",
        category: "Secondary Alignments",
    },
    CompositionRule {
        phrase: "supplementary",
        category: "Supplementary Alignments",
    },
    CompositionRule {
        phrase: "duplicates",
        category: "Duplicates",
    },
    CompositionRule {
        phrase: "mapped",
        category: "Mapped Reads",
    },
    CompositionRule {
        phrase: "paired in sequencing",
        category: "Paired Reads",
    },
    CompositionRule {
        phrase: "read1",
        category: "Read 1",
    },
    CompositionRule {
        phrase: "read2",
        category: "Read 2",
    },
    CompositionRule {
        phrase: "properly paired",
        category: "Properly Paired",
    },
    CompositionRule {
        phrase: "with itself and mate mapped",
        category: "Both Mates Mapped",
    },
    CompositionRule {
        phrase: "singletons",
        category: "Singletons",
    },
    CompositionRule {
        phrase: "with mate mapped to a different chr",
        category: "Mate Different Chr",
    },
];

/// Finds the category for a metric description, if any rule applies.
pub fn categorize(description: &str) -> Option<&'static str> {
    RULES
        .iter()
        .find(|rule| rule.matches(description))
        .map(|rule| rule.category)
}

/// A single metric assigned to a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategorizedMetric {
    /// The metric description from the report.
    pub description: String,

    /// The metric count.
    pub count: u64,
}

/// All metrics assigned to one category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    /// The category name.
    pub category: &'static str,

    /// The metrics in report order.
    pub metrics: Vec<CategorizedMetric>,
}

impl CategoryGroup {
    /// The summed count of the metrics in this category.
    pub fn total(&self) -> u64 {
        self.metrics.iter().map(|m| m.count).sum()
    }
}

/// Groups the metrics of a summary by category. Groups appear in the order
/// their first metric appears in the report.
pub fn group(summary: &AlignmentSummary) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();

    for (description, count) in summary.iter() {
        let category = match categorize(description) {
            Some(category) => category,
            None => continue,
        };

        let metric = CategorizedMetric {
            description: description.to_string(),
            count,
        };

        match groups.iter_mut().find(|g| g.category == category) {
            Some(group) => group.metrics.push(metric),
            None => groups.push(CategoryGroup {
                category,
                metrics: vec![metric],
            }),
        }
    }

    groups
}
