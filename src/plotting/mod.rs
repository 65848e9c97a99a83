//! Plot dispatch and frame-driven animation for stacked views.
//!
//! Every renderer implements the [`Plot`] trait over a frame source (a
//! [`Stack`] of views, or a grid of stacks). Rendering performs one initial
//! pass that draws the top of the stack and caches the handles of every
//! primitive it creates; later frames are produced by [`Plot::render_frame`],
//! which mutates those primitives in place.
//!
//! # Quick Start
//!
//! ```rust
//! use dataviews::plotting::{self, Plot};
//! use dataviews::views::{Bounds, SheetView, Stack};
//! use ndarray::Array2;
//!
//! # fn example() -> dataviews::DataViewResult<()> {
//! let frames = (0..4).map(|t| {
//!     let field = Array2::from_elem((8, 8), t as f64);
//!     (t as f64, SheetView::new(field, Bounds::new(-0.5, -0.5, 0.5, 0.5)))
//! });
//! let stack = Stack::from_items(vec!["time"], frames)?;
//!
//! let plot = plotting::plot(stack)?;
//! assert_eq!(plot.frame_count(), 4);
//!
//! let mut animation = plot.animate(0, None, 10.0)?;
//! animation.run(|_frame, _figure| Ok(()))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Plot trait**: the render / render_frame / animate contract
//! - **Leaf plots**: one frame source, one set of live primitives each
//!   ([`SheetViewPlot`], [`SheetPointsPlot`], [`SheetLinesPlot`],
//!   [`DataCurvePlot`], [`DataHistogramPlot`], [`TablePlot`],
//!   [`AnnotationPlot`])
//! - **Composite plots**: own child plots built through the registry
//!   ([`OverlayPlot`], [`GridLayoutPlot`], [`CoordinateGridPlot`],
//!   [`DataGridPlot`])
//! - **Registry**: the fixed view-kind to renderer table ([`PlotRegistry`])

pub mod animation;
pub mod annotation;
pub mod curve;
pub mod grid;
pub mod histogram;
pub mod overlay;
pub mod registry;
pub mod sheet;
pub mod table;

pub use animation::Animation;
pub use annotation::AnnotationPlot;
pub use curve::DataCurvePlot;
pub use grid::{CoordinateGridPlot, DataGridPlot, GridLayoutPlot};
pub use histogram::DataHistogramPlot;
pub use overlay::OverlayPlot;
pub use registry::{PlotConstructor, PlotRegistry};
pub use sheet::{SheetLinesPlot, SheetPointsPlot, SheetViewPlot};
pub use table::TablePlot;

use std::rc::Rc;

use crate::figure::{AxesHandle, Figure};
use crate::options::{PlotSettings, StyleOptions, StyleRegistry, filter_style};
use crate::views::{Bounds, Plottable, Stack, ViewKind};
use crate::DataViewError;

/// Result type for plotting operations
pub use crate::DataViewResult as PlotResult;

/// Everything a renderer is constructed with besides its frame source.
#[derive(Debug, Clone)]
pub struct PlotContext {
    pub settings: PlotSettings,
    pub options: Rc<StyleRegistry>,
    pub registry: Rc<PlotRegistry>,
    /// Layer index when drawn as part of an overlay; 0 owns the title.
    pub zorder: i32,
}

impl Default for PlotContext {
    fn default() -> Self {
        Self {
            settings: PlotSettings::default(),
            options: Rc::new(StyleRegistry::with_defaults()),
            registry: Rc::new(PlotRegistry::standard()),
            zorder: 0,
        }
    }
}

impl PlotContext {
    pub fn new(settings: PlotSettings, options: StyleRegistry) -> Self {
        Self {
            settings,
            options: Rc::new(options),
            ..Self::default()
        }
    }

    pub fn with_settings(mut self, settings: PlotSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_zorder(mut self, zorder: i32) -> Self {
        self.zorder = zorder;
        self
    }

    /// Context for a child plot: same registries, `settings` replaced.
    pub(crate) fn child(&self, settings: PlotSettings, zorder: i32) -> Self {
        Self {
            settings,
            options: Rc::clone(&self.options),
            registry: Rc::clone(&self.registry),
            zorder,
        }
    }

    /// Registry style options for `group` at `cyclic_index`, restricted to
    /// `allowed`.
    pub(crate) fn style(&self, group: &str, cyclic_index: usize, allowed: &[&str], renderer: &str) -> StyleOptions {
        filter_style(&self.options.style(group, cyclic_index), allowed, renderer)
    }

    pub(crate) const fn owns_title(&self) -> bool {
        self.zorder == 0
    }
}

/// Per-call drawing arguments supplied by a parent plot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrawArgs {
    /// Position of this layer within its style group.
    pub cyclic_index: usize,
    /// Explicit coordinate limits overriding the stack bounds.
    pub lbrt: Option<Bounds>,
}

impl DrawArgs {
    pub const fn new(cyclic_index: usize, lbrt: Option<Bounds>) -> Self {
        Self { cyclic_index, lbrt }
    }
}

/// Core trait for all renderers.
pub trait Plot {
    /// Renderer name used in errors and logs.
    fn name(&self) -> &'static str;

    fn settings(&self) -> &PlotSettings;

    /// Number of indexed frames in the owned frame source.
    fn frame_count(&self) -> usize;

    /// Draw the top of the frame source onto `axes`, or onto a fresh
    /// full-figure axes of `figure` if none is supplied. Returns the axes
    /// drawn on.
    fn render_into(
        &mut self,
        figure: &mut Figure,
        axes: Option<AxesHandle>,
        args: DrawArgs,
    ) -> PlotResult<AxesHandle>;

    /// Update the rendered primitives to show frame `n`, clamped to the last
    /// frame.
    fn render_frame(&mut self, figure: &mut Figure, n: usize) -> PlotResult<()>;

    /// Render onto a new figure sized from the settings and hand it over.
    fn render(&mut self) -> PlotResult<Figure> {
        let mut figure = Figure::new(self.settings().size);
        self.render_into(&mut figure, None, DrawArgs::default())?;
        Ok(figure)
    }

    /// Render a fresh figure showing frame `n`.
    fn snapshot(&mut self, n: usize) -> PlotResult<Figure> {
        let last = self.frame_count().saturating_sub(1);
        if n > last {
            tracing::warn!(renderer = self.name(), requested = n, last, "showing last frame available");
        }
        let mut figure = self.render()?;
        self.render_frame(&mut figure, n)?;
        Ok(figure)
    }

    /// Render the figure and wrap it in an animation stepping through
    /// `frames[start..stop]` at `fps` frames per second.
    fn animate(mut self, start: usize, stop: Option<usize>, fps: f64) -> PlotResult<Animation<Self>>
    where
        Self: Sized,
    {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(DataViewError::invalid_parameter(
                "fps",
                format!("must be a positive number, got {fps}"),
            ));
        }
        let count = self.frame_count();
        let stop = stop.unwrap_or(count).min(count);
        let start = start.min(stop);
        let figure = self.render()?;
        Ok(Animation::new(self, figure, (start..stop).collect(), 1000.0 / fps))
    }
}

impl<P: Plot + ?Sized> Plot for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn settings(&self) -> &PlotSettings {
        (**self).settings()
    }

    fn frame_count(&self) -> usize {
        (**self).frame_count()
    }

    fn render_into(
        &mut self,
        figure: &mut Figure,
        axes: Option<AxesHandle>,
        args: DrawArgs,
    ) -> PlotResult<AxesHandle> {
        (**self).render_into(figure, axes, args)
    }

    fn render_frame(&mut self, figure: &mut Figure, n: usize) -> PlotResult<()> {
        (**self).render_frame(figure, n)
    }
}

/// Resolve the renderer for any frame source with the default context.
pub fn plot(source: impl Into<Plottable>) -> PlotResult<Box<dyn Plot>> {
    plot_with(source, PlotContext::default())
}

/// Resolve the renderer for any frame source through `context.registry`.
pub fn plot_with(source: impl Into<Plottable>, context: PlotContext) -> PlotResult<Box<dyn Plot>> {
    let registry = Rc::clone(&context.registry);
    registry.build(source.into(), context)
}

/// Clamp a frame index to `[0, count - 1]`.
pub fn clamp_frame(n: usize, count: usize) -> usize {
    n.min(count.saturating_sub(1))
}

/// Unwrap a frame source into a stack of `expected` views.
pub(crate) fn check_stack(source: Plottable, renderer: &'static str, expected: ViewKind) -> PlotResult<Stack> {
    let stack = source.into_stack(renderer)?;
    if stack.kind() != expected {
        return Err(DataViewError::TypeMismatch {
            renderer,
            expected,
            actual: stack.kind(),
        });
    }
    Ok(stack)
}

/// Decorations applied when a plot claims an axes.
#[derive(Debug, Default)]
pub(crate) struct AxisDecor<'a> {
    pub title: Option<&'a str>,
    pub owns_title: bool,
    pub xlabel: Option<&'a str>,
    pub ylabel: Option<&'a str>,
    pub lbrt: Option<Bounds>,
    pub xticks: Option<(Vec<f64>, Vec<String>)>,
}

/// Return the axes to draw on, adding a full-figure axes if none was
/// supplied, and apply the axis settings and decorations.
pub(crate) fn prepare_axes(
    figure: &mut Figure,
    axes: Option<AxesHandle>,
    settings: &PlotSettings,
    decor: AxisDecor<'_>,
) -> PlotResult<AxesHandle> {
    let handle = match axes {
        Some(handle) => handle,
        None => figure.add_full_axes(),
    };
    let target = figure.axes_mut(handle)?;

    if !settings.show_axes {
        target.axis_visible = false;
    } else if settings.show_grid {
        target.grid = true;
    }
    if let Some(bounds) = decor.lbrt {
        target.set_limits(&bounds);
    }
    if let Some((values, labels)) = decor.xticks {
        target.xticks = Some(values);
        target.xtick_labels = Some(labels);
    }
    if settings.show_title && decor.owns_title {
        target.title = Some(decor.title.unwrap_or_default().to_string());
    }
    if let Some(label) = decor.xlabel {
        target.xlabel = Some(label.to_string());
    }
    if let Some(label) = decor.ylabel {
        target.ylabel = Some(label.to_string());
    }
    Ok(handle)
}

/// Refresh the title for a new frame if this plot owns it.
pub(crate) fn update_title(
    figure: &mut Figure,
    axes: AxesHandle,
    context: &PlotContext,
    title: Option<&str>,
) -> PlotResult<()> {
    if context.settings.show_title && context.owns_title() {
        figure.axes_mut(axes)?.title = Some(title.unwrap_or_default().to_string());
    }
    Ok(())
}
