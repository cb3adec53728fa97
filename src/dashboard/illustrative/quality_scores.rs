//! Simulated per-base quality scores.

use plotly::common::Mode;
use plotly::common::Title;
use plotly::layout::Axis;
use plotly::Layout;
use plotly::Scatter;
use rand::rngs::StdRng;
use rand_distr::Distribution;
use rand_distr::Normal;

use super::IllustrativePlot;

/// Number of simulated read positions.
const READ_POSITIONS: usize = 300;

/// Markers of Normal(30, 5) quality scores against read position.
pub struct QualityScorePlot;

impl IllustrativePlot for QualityScorePlot {
    fn name(&self) -> &'static str {
        "Simulated Read Quality"
    }

    fn description(&self) -> &'static str {
        "Base-wise quality score along the read."
    }

    fn id(&self) -> &'static str {
        "read-quality"
    }

    fn generate(&self, rng: &mut StdRng) -> anyhow::Result<plotly::Plot> {
        let distribution = Normal::new(30.0, 5.0)?;

        let x = (1..=READ_POSITIONS).collect::<Vec<_>>();
        let y = distribution
            .sample_iter(rng)
            .take(READ_POSITIONS)
            .collect::<Vec<f64>>();

        let mut plot = plotly::Plot::new();
        plot.add_trace(Scatter::new(x, y).mode(Mode::Markers).name("Quality Score"));

        let layout = Layout::new()
            .title(Title::new(self.name()))
            .x_axis(Axis::new().title(Title::new("Read Position")))
            .y_axis(Axis::new().title(Title::new("Quality Score")));
        plot.set_layout(layout);

        Ok(plot)
    }
}
