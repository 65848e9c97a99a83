//! Line-curve renderer with optional cyclic centering.

use super::{
    AxisDecor, DrawArgs, Plot, PlotContext, PlotResult, check_stack, clamp_frame, prepare_axes,
    update_title,
};
use crate::DataViewError;
use crate::figure::{AxesHandle, Figure, LinesHandle};
use crate::options::PlotSettings;
use crate::views::{Bounds, DataCurves, Plottable, Stack, View, ViewKind};

const CURVE_OPTIONS: &[&str] = &["alpha", "color", "linestyle", "linewidth", "visible"];

/// Index of the peak sample: the argmax of the first curve whose maximum
/// exceeds every earlier curve's (and zero).
pub(crate) fn find_peak(curves: &DataCurves) -> usize {
    let mut max_y = 0.0;
    let mut peak = 0;
    for curve in curves.data() {
        let ys = curve.column(1);
        let Some((index, value)) = ys
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, y)| match best {
                Some((_, b)) if b >= y => best,
                _ => Some((i, y)),
            })
        else {
            continue;
        };
        if value > max_y {
            max_y = value;
            peak = index;
        }
    }
    peak
}

/// Convert one curve into a drawable path.
///
/// With a cyclic range the y values are optionally rotated so that `peak`
/// lands mid-curve, and the first point is repeated one period later to
/// close the cycle. The source data is left untouched.
pub(crate) fn curve_path(xs: &[f64], ys: &[f64], cyclic_range: Option<f64>, center: bool, peak: usize) -> Vec<[f64; 2]> {
    let mut ys = ys.to_vec();
    let mut path: Vec<[f64; 2]> = Vec::with_capacity(xs.len() + 1);
    match cyclic_range {
        Some(range) if !xs.is_empty() => {
            if center {
                let shift = (peak + ys.len() / 2) % ys.len();
                ys.rotate_left(shift);
            }
            path.extend(xs.iter().zip(&ys).map(|(x, y)| [*x, *y]));
            path.push([xs[0] + range, ys[0]]);
        }
        _ => path.extend(xs.iter().zip(&ys).map(|(x, y)| [*x, *y])),
    }
    path
}

/// Tick positions and labels for the x axis.
///
/// Non-cyclic curves get `num_ticks + 1` evenly spaced ticks across the x
/// span. Cyclic curves get `num_ticks` ticks over one period, labelled in
/// degrees (or -90..90 when `relative_labels` is set).
pub(crate) fn curve_ticks(xvalues: &[f64], cyclic_range: Option<f64>, settings: &PlotSettings) -> PlotResult<(Vec<f64>, Vec<String>)> {
    let (Some(&first), Some(&last)) = (xvalues.first(), xvalues.last()) else {
        return Ok((Vec::new(), Vec::new()));
    };
    let num_ticks = settings.num_ticks;

    match cyclic_range {
        None => {
            if num_ticks == 0 {
                return Ok((Vec::new(), Vec::new()));
            }
            let step = (last - first) / num_ticks as f64;
            let values: Vec<f64> = (0..=num_ticks).map(|i| first + i as f64 * step).collect();
            let labels = values
                .iter()
                .map(|v| format!("{}", (v * 100.0).round() / 100.0))
                .collect();
            Ok((values, labels))
        }
        Some(range) => {
            if num_ticks < 2 {
                return Err(DataViewError::invalid_parameter(
                    "num_ticks",
                    format!("cyclic curves need at least 2 ticks, got {num_ticks}"),
                ));
            }
            let step = range / (num_ticks - 1) as f64;
            let values: Vec<f64> = (0..num_ticks).map(|i| first + i as f64 * step).collect();
            let labels = if settings.relative_labels {
                let label_step = 180.0 / (num_ticks - 1) as f64;
                (0..num_ticks)
                    .map(|i| format!("{}", -90.0 + i as f64 * label_step))
                    .collect()
            } else {
                values
                    .iter()
                    .map(|x| format!("{}", (180.0 * x / range).round() as i64))
                    .collect()
            };
            Ok((values, labels))
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CurveState {
    axes: AxesHandle,
    lines: LinesHandle,
    peak: usize,
}

/// Draws a stack of [`DataCurves`] as one line collection.
#[derive(Debug)]
pub struct DataCurvePlot {
    stack: Stack,
    context: PlotContext,
    state: Option<CurveState>,
}

impl DataCurvePlot {
    pub const NAME: &'static str = "DataCurvePlot";

    pub fn new(source: impl Into<Plottable>, context: PlotContext) -> PlotResult<Self> {
        Ok(Self {
            stack: check_stack(source.into(), Self::NAME, ViewKind::DataCurves)?,
            context,
            state: None,
        })
    }

    pub(crate) fn boxed(source: Plottable, context: PlotContext) -> PlotResult<Box<dyn Plot>> {
        Ok(Box::new(Self::new(source, context)?))
    }

    pub fn lines_handle(&self) -> Option<LinesHandle> {
        self.state.map(|s| s.lines)
    }

    fn curves_at(&self, n: usize) -> PlotResult<&DataCurves> {
        match self.stack.view(n) {
            Some(View::Curves(curves)) => Ok(curves),
            _ => Err(DataViewError::structure("curve stack holds a non-curve view")),
        }
    }

    fn paths(&self, curves: &DataCurves, peak: usize) -> Vec<Vec<[f64; 2]>> {
        curves
            .data()
            .iter()
            .map(|curve| {
                let xs = curve.column(0).to_vec();
                let ys = curve.column(1).to_vec();
                curve_path(&xs, &ys, curves.cyclic_range(), self.context.settings.center, peak)
            })
            .collect()
    }
}

impl Plot for DataCurvePlot {
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
        let curves = self.curves_at(self.stack.len() - 1)?;
        let peak = find_peak(curves);
        let paths = self.paths(curves, peak);
        let ticks = curve_ticks(&curves.xvalues(), curves.cyclic_range(), &self.context.settings)?;
        let lbrt = args
            .lbrt
            .or_else(|| Bounds::enclosing(paths.iter().flatten().map(|p| (p[0], p[1]))));

        let metadata = &curves.metadata;
        let axes = prepare_axes(
            figure,
            axes,
            &self.context.settings,
            AxisDecor {
                title: metadata.title.as_deref(),
                owns_title: self.context.owns_title(),
                xlabel: metadata.xlabel.as_deref(),
                ylabel: metadata.ylabel.as_deref(),
                lbrt,
                xticks: Some(ticks),
            },
        )?;

        let group = metadata.style.as_deref().unwrap_or(ViewKind::DataCurves.name());
        let style = self.context.style(group, args.cyclic_index, CURVE_OPTIONS, Self::NAME);
        let label = metadata.legend_label.clone();
        let lines = figure.add_lines(axes, paths, label, style, self.context.zorder)?;

        if self.context.settings.show_legend {
            let mut entries = figure.legend_labels(axes)?;
            if !entries.is_empty() {
                entries.reverse();
                figure.set_legend(axes, entries)?;
            }
        }

        self.state = Some(CurveState { axes, lines, peak });
        Ok(axes)
    }

    fn render_frame(&mut self, figure: &mut Figure, n: usize) -> PlotResult<()> {
        let state = self.state.ok_or(DataViewError::NotRendered(Self::NAME))?;
        let curves = self.curves_at(clamp_frame(n, self.stack.len()))?;
        let paths = self.paths(curves, state.peak);
        let title = curves.metadata.title.clone();
        figure.set_paths(state.lines, paths)?;
        update_title(figure, state.axes, &self.context, title.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cyclic_path_closes_without_mutating() {
        let curves = DataCurves::new(vec![array![[0.0, 1.0], [1.0, 5.0], [2.0, 2.0], [3.0, 0.0]]])
            .expect("valid")
            .with_cyclic_range(4.0);
        let peak = find_peak(&curves);
        assert_eq!(peak, 1);

        let xs = curves.data()[0].column(0).to_vec();
        let ys = curves.data()[0].column(1).to_vec();
        let path = curve_path(&xs, &ys, curves.cyclic_range(), true, peak);
        assert_eq!(path.len(), 5);
        // peak 1 + half-length 2 = shift 3
        assert_eq!(path[0], [0.0, 0.0]);
        assert_eq!(path[1], [1.0, 1.0]);
        assert_eq!(path[4], [4.0, 0.0]);
        assert_eq!(curves.data()[0][[1, 1]], 5.0);
    }

    #[test]
    fn test_non_cyclic_path_unchanged() {
        let path = curve_path(&[0.0, 1.0], &[3.0, 4.0], None, true, 0);
        assert_eq!(path, vec![[0.0, 3.0], [1.0, 4.0]]);
    }

    #[test]
    fn test_linear_ticks() {
        let settings = PlotSettings {
            num_ticks: 4,
            ..PlotSettings::default()
        };
        let (values, labels) = curve_ticks(&[0.0, 0.5, 1.0], None, &settings).expect("ticks");
        assert_eq!(values, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(labels, vec!["0", "0.25", "0.5", "0.75", "1"]);
    }

    #[test]
    fn test_cyclic_ticks() {
        let settings = PlotSettings {
            num_ticks: 3,
            ..PlotSettings::default()
        };
        let range = std::f64::consts::PI;
        let (values, labels) = curve_ticks(&[0.0, 1.0], Some(range), &settings).expect("ticks");
        assert_eq!(values.len(), 3);
        assert_eq!(labels, vec!["0", "90", "180"]);

        let relative = PlotSettings {
            relative_labels: true,
            ..settings.clone()
        };
        let (_, labels) = curve_ticks(&[0.0, 1.0], Some(range), &relative).expect("ticks");
        assert_eq!(labels, vec!["-90", "0", "90"]);

        let one = PlotSettings {
            num_ticks: 1,
            ..settings
        };
        assert!(curve_ticks(&[0.0, 1.0], Some(range), &one).is_err());
    }

    #[test]
    fn test_legend_and_frames() {
        let frame = |scale: f64| {
            DataCurves::new(vec![array![[0.0, 0.0], [1.0, scale]]])
                .expect("valid")
                .with_legend_label("response")
                .with_title(format!("scale {scale}"))
        };
        let stack = Stack::from_items(vec!["time"], vec![(0.0, frame(1.0)), (1.0, frame(2.0))])
            .expect("valid");
        let mut plot = DataCurvePlot::new(stack, PlotContext::default()).expect("curves");
        let mut figure = plot.render().expect("render");
        let axes = figure.axes_handles().next().expect("axes");
        assert_eq!(
            figure.axes(axes).expect("axes").legend,
            Some(vec!["response".to_string()])
        );

        plot.render_frame(&mut figure, 0).expect("frame");
        let lines = plot.lines_handle().expect("rendered");
        assert_eq!(figure.paths(lines).expect("lines")[0][1], [1.0, 1.0]);
        assert_eq!(figure.axes(axes).expect("axes").title.as_deref(), Some("scale 1"));
    }
}
