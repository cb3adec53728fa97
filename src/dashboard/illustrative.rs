//! Illustrative charts drawn from fixed random distributions.
//!
//! None of these charts are computed from the uploaded file. They exist to
//! show what the corresponding quality control views look like, and every one
//! of them is titled and captioned as simulated.

pub mod coverage_depth;
pub mod gc_content;
pub mod quality_scores;
pub mod read_length;

use rand::rngs::StdRng;
use rand_distr::Distribution;

/// Caption shown under every illustrative chart.
pub const CAPTION: &str =
    "Illustrative only: drawn from a simulated distribution, not computed from the uploaded file.";

/// A chart generated from simulated data.
pub trait IllustrativePlot {
    /// The name of this plot.
    fn name(&self) -> &'static str;

    /// A short description of what the plot would show for real data.
    fn description(&self) -> &'static str;

    /// Identifier used for the element the plot is drawn in.
    fn id(&self) -> &'static str;

    /// Generates the plot from the provided random number generator.
    fn generate(&self, rng: &mut StdRng) -> anyhow::Result<plotly::Plot>;
}

/// Gets all of the illustrative plots in display order.
pub fn get_all_illustrative_plots() -> Vec<Box<dyn IllustrativePlot>> {
    vec![
        Box::new(gc_content::GCContentPlot),
        Box::new(coverage_depth::CoverageDepthPlot),
        Box::new(read_length::ReadLengthPlot),
        Box::new(quality_scores::QualityScorePlot),
    ]
}

/// Draws `n` samples from `distribution`, clamping each into `[min, max]`.
pub(crate) fn sample_clamped<D>(
    distribution: D,
    n: usize,
    min: f64,
    max: f64,
    rng: &mut StdRng,
) -> Vec<f64>
where
    D: Distribution<f64>,
{
    distribution
        .sample_iter(rng)
        .take(n)
        .map(|value| value.clamp(min, max))
        .collect()
}
