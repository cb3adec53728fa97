//! Simulated GC content distribution.

use plotly::common::Title;
use plotly::layout::Axis;
use plotly::Histogram;
use plotly::Layout;
use rand::rngs::StdRng;
use rand_distr::Normal;

use super::sample_clamped;
use super::IllustrativePlot;

/// A histogram of per-read GC percentage drawn from Normal(50, 10).
pub struct GCContentPlot;

impl IllustrativePlot for GCContentPlot {
    fn name(&self) -> &'static str {
        "Simulated GC Content Distribution"
    }

    fn description(&self) -> &'static str {
        "Distribution of GC content across reads."
    }

    fn id(&self) -> &'static str {
        "gc-content"
    }

    fn generate(&self, rng: &mut StdRng) -> anyhow::Result<plotly::Plot> {
        let gc = sample_clamped(Normal::new(50.0, 10.0)?, 1_000, 0.0, 100.0, rng);

        let mut plot = plotly::Plot::new();
        plot.add_trace(Histogram::new(gc).n_bins_x(20).name("GC (%)"));

        let layout = Layout::new()
            .title(Title::new(self.name()))
            .x_axis(Axis::new().title(Title::new("GC (%)")))
            .y_axis(Axis::new().title(Title::new("Count of reads")));
        plot.set_layout(layout);

        Ok(plot)
    }
}
