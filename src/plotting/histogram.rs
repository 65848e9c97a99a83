//! Bar renderer for histograms.

use super::{
    AxisDecor, DrawArgs, Plot, PlotContext, PlotResult, check_stack, clamp_frame, prepare_axes,
    update_title,
};
use crate::DataViewError;
use crate::figure::{AxesHandle, BarsHandle, Figure};
use crate::options::PlotSettings;
use crate::views::{DataHistogram, Plottable, Stack, View, ViewKind};

const HISTOGRAM_OPTIONS: &[&str] = &[
    "alpha", "color", "align", "width", "visible", "edgecolor", "log", "ecolor", "capsize", "hatch",
];

#[derive(Debug, Clone, Copy)]
struct HistogramState {
    axes: AxesHandle,
    bars: BarsHandle,
}

/// Draws a stack of [`DataHistogram`]s as a fixed set of bars.
///
/// The bar count is set by the initial render; a frame with a different
/// number of bins is rejected without touching the drawn bars.
#[derive(Debug)]
pub struct DataHistogramPlot {
    stack: Stack,
    context: PlotContext,
    state: Option<HistogramState>,
}

impl DataHistogramPlot {
    pub const NAME: &'static str = "DataHistogramPlot";

    pub fn new(source: impl Into<Plottable>, context: PlotContext) -> PlotResult<Self> {
        Ok(Self {
            stack: check_stack(source.into(), Self::NAME, ViewKind::DataHistogram)?,
            context,
            state: None,
        })
    }

    pub(crate) fn boxed(source: Plottable, context: PlotContext) -> PlotResult<Box<dyn Plot>> {
        Ok(Box::new(Self::new(source, context)?))
    }

    pub fn bars_handle(&self) -> Option<BarsHandle> {
        self.state.map(|s| s.bars)
    }

    fn histogram_at(&self, n: usize) -> PlotResult<&DataHistogram> {
        match self.stack.view(n) {
            Some(View::Histogram(hist)) => Ok(hist),
            _ => Err(DataViewError::structure("histogram stack holds a non-histogram view")),
        }
    }
}

fn bar_geometry(hist: &DataHistogram) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let lefts = hist.edges()[..hist.bins()].to_vec();
    (lefts, hist.widths(), hist.hist().to_vec())
}

impl Plot for DataHistogramPlot {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn settings(&self) -> &PlotSettings {
        &self.context.settings
    }

    fn frame_count(&self) -> usize {
        self.stack.len()
    }

    fn render_into(
        &mut self,
        figure: &mut Figure,
        axes: Option<AxesHandle>,
        args: DrawArgs,
    ) -> PlotResult<AxesHandle> {
        let hist = self.histogram_at(self.stack.len() - 1)?;
        let metadata = &hist.metadata;
        let axes = prepare_axes(
            figure,
            axes,
            &self.context.settings,
            AxisDecor {
                title: metadata.title.as_deref(),
                owns_title: self.context.owns_title(),
                xlabel: metadata.xlabel.as_deref(),
                ylabel: metadata.ylabel.as_deref(),
                lbrt: args.lbrt.or_else(|| hist.lbrt()),
                xticks: None,
            },
        )?;

        let group = metadata.style.as_deref().unwrap_or(ViewKind::DataHistogram.name());
        let style = self.context.style(group, args.cyclic_index, HISTOGRAM_OPTIONS, Self::NAME);
        let (lefts, widths, heights) = bar_geometry(hist);
        let bars = figure.add_bars(axes, lefts, widths, heights, style, self.context.zorder)?;

        self.state = Some(HistogramState { axes, bars });
        Ok(axes)
    }

    fn render_frame(&mut self, figure: &mut Figure, n: usize) -> PlotResult<()> {
        let state = self.state.ok_or(DataViewError::NotRendered(Self::NAME))?;
        let hist = self.histogram_at(clamp_frame(n, self.stack.len()))?;

        let drawn = figure.bar_count(state.bars)?;
        if hist.bins() != drawn {
            return Err(DataViewError::structure(format!(
                "histogram frame {n} has {} bins but {drawn} bars are drawn",
                hist.bins()
            )));
        }
        let (lefts, widths, heights) = bar_geometry(hist);
        figure.set_bars(state.bars, lefts, widths, heights)?;
        update_title(figure, state.axes, &self.context, hist.metadata.title.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> Stack {
        Stack::from_items(
            vec!["time"],
            vec![
                (0.0, DataHistogram::new(vec![1.0, 2.0], vec![0.0, 1.0, 2.0]).expect("valid")),
                (1.0, DataHistogram::new(vec![3.0, 4.0], vec![0.0, 1.0, 2.0]).expect("valid")),
                (
                    2.0,
                    DataHistogram::new(vec![1.0, 1.0, 1.0], vec![0.0, 1.0, 2.0, 3.0]).expect("valid"),
                ),
            ],
        )
        .expect("valid stack")
    }

    #[test]
    fn test_bars_follow_frames() {
        let two_bins = Stack::from_items(
            vec!["time"],
            vec![
                (0.0, DataHistogram::new(vec![1.0, 2.0], vec![0.0, 1.0, 2.0]).expect("valid")),
                (1.0, DataHistogram::new(vec![3.0, 4.0], vec![0.0, 1.0, 2.0]).expect("valid")),
            ],
        )
        .expect("valid stack");
        let mut plot = DataHistogramPlot::new(two_bins, PlotContext::default()).expect("histogram");
        let mut figure = plot.render().expect("render");
        let bars = plot.bars_handle().expect("rendered");
        assert_eq!(figure.bars(bars).expect("bars").2, &[3.0, 4.0]);

        plot.render_frame(&mut figure, 0).expect("frame");
        let (lefts, widths, heights) = figure.bars(bars).expect("bars");
        assert_eq!(lefts, &[0.0, 1.0]);
        assert_eq!(widths, &[1.0, 1.0]);
        assert_eq!(heights, &[1.0, 2.0]);
    }

    #[test]
    fn test_bin_mismatch_keeps_bars() {
        let mut plot = DataHistogramPlot::new(stack(), PlotContext::default()).expect("histogram");
        let mut figure = plot.render().expect("render");
        let bars = plot.bars_handle().expect("rendered");
        assert_eq!(figure.bar_count(bars).expect("bars"), 3);

        let err = plot.render_frame(&mut figure, 0).expect_err("bin count differs");
        assert!(matches!(err, DataViewError::Structure(_)));
        assert_eq!(figure.bars(bars).expect("bars").2, &[1.0, 1.0, 1.0]);
    }
}
