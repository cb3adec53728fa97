//! Simulated read length distribution.

use plotly::common::Title;
use plotly::layout::Axis;
use plotly::Histogram;
use plotly::Layout;
use rand::rngs::StdRng;
use rand_distr::Normal;

use super::sample_clamped;
use super::IllustrativePlot;

/// A histogram of read lengths drawn from Normal(150, 20), clamped to [50, 300].
pub struct ReadLengthPlot;

impl IllustrativePlot for ReadLengthPlot {
    fn name(&self) -> &'static str {
        "Simulated Read Length Distribution"
    }

    fn description(&self) -> &'static str {
        "Distribution of read lengths."
    }

    fn id(&self) -> &'static str {
        "read-length"
    }

    fn generate(&self, rng: &mut StdRng) -> anyhow::Result<plotly::Plot> {
        let lengths = sample_clamped(Normal::new(150.0, 20.0)?, 1_000, 50.0, 300.0, rng);

        let mut plot = plotly::Plot::new();
        plot.add_trace(Histogram::new(lengths).n_bins_x(30).name("Read Length"));

        let layout = Layout::new()
            .title(Title::new(self.name()))
            .x_axis(Axis::new().title(Title::new("Read Length (bp)")))
            .y_axis(Axis::new().title(Title::new("Counts")));
        plot.set_layout(layout);

        Ok(plot)
    }
}
