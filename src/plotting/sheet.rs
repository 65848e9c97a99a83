//! Renderers for spatial views: rasters, point sets and line collections.

use super::{
    AxisDecor, DrawArgs, Plot, PlotContext, PlotResult, check_stack, clamp_frame, prepare_axes,
    update_title,
};
use crate::DataViewError;
use crate::figure::{AxesHandle, ColorbarHandle, Figure, ImageHandle, LinesHandle, ScatterHandle};
use crate::options::PlotSettings;
use crate::views::{Plottable, SheetLines, SheetPoints, SheetView, Stack, View, ViewKind};

const RASTER_OPTIONS: &[&str] = &["alpha", "cmap", "interpolation", "visible", "filterrad", "origin"];
const POINTS_OPTIONS: &[&str] = &["alpha", "color", "marker", "s", "visible"];
const LINES_OPTIONS: &[&str] = &["alpha", "color", "linestyle", "linewidth", "visible"];

/// Display scale of a raster: `(0, cyclic range)` if declared, else
/// `(0, max)`.
pub(crate) fn raster_clim(view: &SheetView) -> (f64, f64) {
    (0.0, view.cyclic_range().unwrap_or_else(|| view.max()))
}

fn sheet_at(stack: &Stack, n: usize) -> Option<&SheetView> {
    match stack.view(n) {
        Some(View::Sheet(view)) => Some(view),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
struct RasterState {
    axes: AxesHandle,
    image: ImageHandle,
    colorbar: Option<ColorbarHandle>,
}

/// Draws a stack of [`SheetView`]s as an image.
#[derive(Debug)]
pub struct SheetViewPlot {
    stack: Stack,
    context: PlotContext,
    state: Option<RasterState>,
}

impl SheetViewPlot {
    pub const NAME: &'static str = "SheetViewPlot";

    pub fn new(source: impl Into<Plottable>, context: PlotContext) -> PlotResult<Self> {
        Ok(Self {
            stack: check_stack(source.into(), Self::NAME, ViewKind::SheetView)?,
            context,
            state: None,
        })
    }

    pub(crate) fn boxed(source: Plottable, context: PlotContext) -> PlotResult<Box<dyn Plot>> {
        Ok(Box::new(Self::new(source, context)?))
    }

    pub fn image_handle(&self) -> Option<ImageHandle> {
        self.state.map(|s| s.image)
    }

    pub fn colorbar_handle(&self) -> Option<ColorbarHandle> {
        self.state.and_then(|s| s.colorbar)
    }

    /// Hide the colour bar for an all-zero frame, showing a placeholder
    /// `(0, 1)` scale.
    fn toggle_colorbar(figure: &mut Figure, bar: ColorbarHandle, data_max: f64, cmax: f64) -> PlotResult<()> {
        let visible = data_max != 0.0;
        let clim = if visible { (0.0, cmax) } else { (0.0, 1.0) };
        figure.set_colorbar(bar, clim, visible)
    }
}

impl Plot for SheetViewPlot {
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
        let last = self.stack.len() - 1;
        let view = sheet_at(&self.stack, last)
            .ok_or_else(|| DataViewError::structure("raster stack holds a non-raster view"))?;
        let bounds = view.bounds();
        let axes = prepare_axes(
            figure,
            axes,
            &self.context.settings,
            AxisDecor {
                title: view.metadata.title.as_deref(),
                owns_title: self.context.owns_title(),
                xlabel: Some("x"),
                ylabel: Some("y"),
                lbrt: self.stack.bounds(),
                xticks: None,
            },
        )?;

        let mut style = self.context.style(
            view.metadata.style.as_deref().unwrap_or(ViewKind::SheetView.name()),
            args.cyclic_index,
            RASTER_OPTIONS,
            Self::NAME,
        );
        if view.depth() != 1 {
            style.remove("cmap");
        }
        let clim = raster_clim(view);
        let image = figure.add_image(axes, view.data().clone(), bounds, clim, style, self.context.zorder)?;

        let colorbar = match self.context.settings.colorbar {
            Some(orientation) => {
                let bar = figure.add_colorbar(axes, image, orientation)?;
                Self::toggle_colorbar(figure, bar, view.max(), clim.1)?;
                Some(bar)
            }
            None => None,
        };

        self.state = Some(RasterState {
            axes,
            image,
            colorbar,
        });
        Ok(axes)
    }

    fn render_frame(&mut self, figure: &mut Figure, n: usize) -> PlotResult<()> {
        let state = self.state.ok_or(DataViewError::NotRendered(Self::NAME))?;
        let n = clamp_frame(n, self.stack.len());
        let view = sheet_at(&self.stack, n)
            .ok_or_else(|| DataViewError::structure("raster stack holds a non-raster view"))?;

        let clim = raster_clim(view);
        figure.set_image_data(state.image, view.data().clone())?;
        figure.set_clim(state.image, clim)?;
        if let Some(bar) = state.colorbar {
            Self::toggle_colorbar(figure, bar, view.max(), clim.1)?;
        }
        update_title(figure, state.axes, &self.context, view.metadata.title.as_deref())
    }
}

#[derive(Debug, Clone, Copy)]
struct PointsState {
    axes: AxesHandle,
    scatter: ScatterHandle,
}

/// Draws a stack of [`SheetPoints`] as a scatter collection.
#[derive(Debug)]
pub struct SheetPointsPlot {
    stack: Stack,
    context: PlotContext,
    state: Option<PointsState>,
}

impl SheetPointsPlot {
    pub const NAME: &'static str = "SheetPointsPlot";

    pub fn new(source: impl Into<Plottable>, context: PlotContext) -> PlotResult<Self> {
        Ok(Self {
            stack: check_stack(source.into(), Self::NAME, ViewKind::SheetPoints)?,
            context,
            state: None,
        })
    }

    pub(crate) fn boxed(source: Plottable, context: PlotContext) -> PlotResult<Box<dyn Plot>> {
        Ok(Box::new(Self::new(source, context)?))
    }

    pub fn scatter_handle(&self) -> Option<ScatterHandle> {
        self.state.map(|s| s.scatter)
    }

    fn points_at(&self, n: usize) -> PlotResult<&SheetPoints> {
        match self.stack.view(n) {
            Some(View::Points(points)) => Ok(points),
            _ => Err(DataViewError::structure("point stack holds a non-point view")),
        }
    }
}

impl Plot for SheetPointsPlot {
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
        let points = self.points_at(self.stack.len() - 1)?;
        let axes = prepare_axes(
            figure,
            axes,
            &self.context.settings,
            AxisDecor {
                title: points.metadata.title.as_deref(),
                owns_title: self.context.owns_title(),
                xlabel: Some("x"),
                ylabel: Some("y"),
                lbrt: self.stack.bounds(),
                xticks: None,
            },
        )?;
        let style = self.context.style(
            points.metadata.style.as_deref().unwrap_or(ViewKind::SheetPoints.name()),
            args.cyclic_index,
            POINTS_OPTIONS,
            Self::NAME,
        );
        let scatter = figure.add_scatter(axes, points.points(), style, self.context.zorder)?;
        self.state = Some(PointsState { axes, scatter });
        Ok(axes)
    }

    fn render_frame(&mut self, figure: &mut Figure, n: usize) -> PlotResult<()> {
        let state = self.state.ok_or(DataViewError::NotRendered(Self::NAME))?;
        let points = self.points_at(clamp_frame(n, self.stack.len()))?;
        figure.set_offsets(state.scatter, points.points())?;
        update_title(figure, state.axes, &self.context, points.metadata.title.as_deref())
    }
}

#[derive(Debug, Clone, Copy)]
struct LinesState {
    axes: AxesHandle,
    lines: LinesHandle,
}

/// Draws a stack of [`SheetLines`] as one path collection.
#[derive(Debug)]
pub struct SheetLinesPlot {
    stack: Stack,
    context: PlotContext,
    state: Option<LinesState>,
}

impl SheetLinesPlot {
    pub const NAME: &'static str = "SheetLinesPlot";

    pub fn new(source: impl Into<Plottable>, context: PlotContext) -> PlotResult<Self> {
        Ok(Self {
            stack: check_stack(source.into(), Self::NAME, ViewKind::SheetLines)?,
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

    fn lines_at(&self, n: usize) -> PlotResult<&SheetLines> {
        match self.stack.view(n) {
            Some(View::Lines(lines)) => Ok(lines),
            _ => Err(DataViewError::structure("line stack holds a non-line view")),
        }
    }
}

impl Plot for SheetLinesPlot {
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
        let lines = self.lines_at(self.stack.len() - 1)?;
        let axes = prepare_axes(
            figure,
            axes,
            &self.context.settings,
            AxisDecor {
                title: lines.metadata.title.as_deref(),
                owns_title: self.context.owns_title(),
                xlabel: Some("x"),
                ylabel: Some("y"),
                lbrt: self.stack.bounds(),
                xticks: None,
            },
        )?;
        let style = self.context.style(
            lines.metadata.style.as_deref().unwrap_or(ViewKind::SheetLines.name()),
            args.cyclic_index,
            LINES_OPTIONS,
            Self::NAME,
        );
        let handle = figure.add_lines(axes, lines.paths(), None, style, self.context.zorder)?;
        self.state = Some(LinesState {
            axes,
            lines: handle,
        });
        Ok(axes)
    }

    fn render_frame(&mut self, figure: &mut Figure, n: usize) -> PlotResult<()> {
        let state = self.state.ok_or(DataViewError::NotRendered(Self::NAME))?;
        let lines = self.lines_at(clamp_frame(n, self.stack.len()))?;
        figure.set_paths(state.lines, lines.paths())?;
        update_title(figure, state.axes, &self.context, lines.metadata.title.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Orientation;
    use crate::views::{Bounds, DataCurves};
    use ndarray::{Array2, array};

    fn unit() -> Bounds {
        Bounds::new(0.0, 0.0, 1.0, 1.0)
    }

    fn raster_stack() -> Stack {
        Stack::from_items(
            vec!["time"],
            vec![
                (0.0, SheetView::new(Array2::zeros((2, 2)), unit()).with_title("t=0")),
                (1.0, SheetView::new(Array2::from_elem((2, 2), 4.0), unit()).with_title("t=1")),
            ],
        )
        .expect("valid stack")
    }

    #[test]
    fn test_type_mismatch_at_construction() {
        let curves = DataCurves::new(vec![array![[0.0, 1.0]]]).expect("valid");
        let err = SheetViewPlot::new(curves, PlotContext::default()).expect_err("wrong kind");
        assert!(matches!(
            err,
            DataViewError::TypeMismatch {
                expected: ViewKind::SheetView,
                actual: ViewKind::DataCurves,
                ..
            }
        ));
    }

    #[test]
    fn test_raster_draws_top_and_updates_clim() {
        let mut plot = SheetViewPlot::new(raster_stack(), PlotContext::default()).expect("raster");
        let mut figure = plot.render().expect("render");
        let image = plot.image_handle().expect("rendered");
        assert_eq!(figure.image(image).expect("image").1, (0.0, 4.0));

        plot.render_frame(&mut figure, 0).expect("frame 0");
        assert_eq!(figure.image(image).expect("image").1, (0.0, 0.0));
        let axes = figure.axes_handles().next().expect("axes");
        assert_eq!(figure.axes(axes).expect("axes").title.as_deref(), Some("t=0"));
    }

    #[test]
    fn test_cyclic_range_fixes_scale() {
        let view = SheetView::new(Array2::from_elem((2, 2), 0.5), unit()).with_cyclic_range(1.0);
        let mut plot = SheetViewPlot::new(view, PlotContext::default()).expect("raster");
        let figure = plot.render().expect("render");
        let image = plot.image_handle().expect("rendered");
        assert_eq!(figure.image(image).expect("image").1, (0.0, 1.0));
    }

    #[test]
    fn test_colorbar_hidden_for_zero_frame() {
        let context = PlotContext::default()
            .with_settings(PlotSettings::default().with_colorbar(Orientation::Vertical));
        let mut plot = SheetViewPlot::new(raster_stack(), context).expect("raster");
        let mut figure = plot.render().expect("render");
        let bar = plot.colorbar_handle().expect("colorbar");
        assert_eq!(figure.colorbar(bar).expect("bar"), ((0.0, 4.0), true));

        plot.render_frame(&mut figure, 0).expect("frame 0");
        assert_eq!(figure.colorbar(bar).expect("bar"), ((0.0, 1.0), false));
    }

    #[test]
    fn test_rgb_drops_cmap() {
        let view = SheetView::rgb(ndarray::Array3::zeros((2, 2, 3)), unit()).expect("rgb");
        let mut plot = SheetViewPlot::new(view, PlotContext::default()).expect("raster");
        let figure = plot.render().expect("render");
        let image = plot.image_handle().expect("rendered");
        let style = figure.primitive(image.id()).expect("live").style().expect("styled");
        assert!(!style.contains_key("cmap"));
    }

    #[test]
    fn test_render_frame_before_render() {
        let mut plot = SheetViewPlot::new(raster_stack(), PlotContext::default()).expect("raster");
        let mut figure = Figure::new((5.0, 5.0));
        let err = plot.render_frame(&mut figure, 0).expect_err("not rendered");
        assert!(matches!(err, DataViewError::NotRendered(_)));
    }

    #[test]
    fn test_points_offsets_follow_frames() {
        let stack = Stack::from_items(
            vec!["time"],
            vec![
                (0.0, SheetPoints::new(array![[0.1, 0.1]], unit()).expect("valid")),
                (1.0, SheetPoints::new(array![[0.9, 0.9], [0.5, 0.5]], unit()).expect("valid")),
            ],
        )
        .expect("valid stack");
        let mut plot = SheetPointsPlot::new(stack, PlotContext::default()).expect("points");
        let mut figure = plot.render().expect("render");
        let scatter = plot.scatter_handle().expect("rendered");
        assert_eq!(figure.offsets(scatter).expect("scatter").len(), 2);
        plot.render_frame(&mut figure, 0).expect("frame");
        assert_eq!(figure.offsets(scatter).expect("scatter"), &[[0.1, 0.1]]);
    }

    #[test]
    fn test_lines_paths_follow_frames() {
        let stack = Stack::from_items(
            vec!["time"],
            vec![
                (0.0, SheetLines::new(vec![array![[0.0, 0.0], [1.0, 1.0]]], unit()).expect("valid")),
                (1.0, SheetLines::new(vec![], unit()).expect("valid")),
            ],
        )
        .expect("valid stack");
        let mut plot = SheetLinesPlot::new(stack, PlotContext::default()).expect("lines");
        let mut figure = plot.render().expect("render");
        let lines = plot.lines_handle().expect("rendered");
        assert!(figure.paths(lines).expect("lines").is_empty());
        plot.render_frame(&mut figure, 5).expect("clamped frame");
        assert!(figure.paths(lines).expect("lines").is_empty());
        plot.render_frame(&mut figure, 0).expect("frame");
        assert_eq!(figure.paths(lines).expect("lines").len(), 1);
    }
}
