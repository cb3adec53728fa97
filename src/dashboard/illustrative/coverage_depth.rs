//! Simulated coverage depth across the genome.

use plotly::common::Mode;
use plotly::common::Title;
use plotly::layout::Axis;
use plotly::Layout;
use plotly::Scatter;
use rand::rngs::StdRng;
use rand_distr::Distribution;
use rand_distr::LogNormal;

use super::IllustrativePlot;

/// Number of simulated positions.
const POSITIONS: usize = 1_000;

/// A line of LogNormal(2, 0.5) depths against genomic position.
pub struct CoverageDepthPlot;

impl IllustrativePlot for CoverageDepthPlot {
    fn name(&self) -> &'static str {
        "Simulated Coverage Across Genome"
    }

    fn description(&self) -> &'static str {
        "Coverage depth along the genome."
    }

    fn id(&self) -> &'static str {
        "coverage-depth"
    }

    fn generate(&self, rng: &mut StdRng) -> anyhow::Result<plotly::Plot> {
        let distribution = LogNormal::new(2.0, 0.5)?;

        let x = (0..POSITIONS).collect::<Vec<_>>();
        let y = distribution
            .sample_iter(rng)
            .take(POSITIONS)
            .collect::<Vec<f64>>();

        let mut plot = plotly::Plot::new();
        plot.add_trace(Scatter::new(x, y).mode(Mode::Lines).name("Depth"));

        let layout = Layout::new()
            .title(Title::new(self.name()))
            .show_legend(false)
            .x_axis(Axis::new().title(Title::new("Genomic Position")))
            .y_axis(Axis::new().title(Title::new("Coverage Depth")));
        plot.set_layout(layout);

        Ok(plot)
    }
}
