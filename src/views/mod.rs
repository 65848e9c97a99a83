//! Data containers for plottable views.
//!
//! A [`View`] is one immutable unit of data to be drawn (a raster, a point
//! set, a curve, a table...). A [`Stack`] is an ordered, keyed collection of
//! views of one kind that evolves along one or more dimensions, typically
//! time. Grids ([`GridLayout`], [`CoordinateGrid`], [`DataGrid`]) map discrete
//! 2-D coordinates to stacks.
//!
//! Everything a renderer can be constructed over is a [`Plottable`]; a bare
//! view converts into a single-frame stack on the way in.

pub mod annotation;
pub mod data;
pub mod grid;
pub mod overlay;
pub mod sheet;
pub mod stack;
pub mod table;

pub use annotation::{Annotation, ArrowDirection, DrawSpec, Interval, Shape};
pub use data::{DataCurves, DataHistogram};
pub use grid::{CoordinateGrid, DataGrid, GridLayout};
pub use overlay::Overlay;
pub use sheet::{SheetLines, SheetPoints, SheetView};
pub use stack::{DEFAULT_DIMENSION, Key, Stack};
pub use table::{CellType, CellValue, TableView};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DataViewError, DataViewResult};

/// Rectangular extent of a 2-D view as `(left, bottom, right, top)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl Bounds {
    pub const fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    /// The extent as a `(left, bottom, right, top)` tuple.
    pub const fn lbrt(&self) -> (f64, f64, f64, f64) {
        (self.left, self.bottom, self.right, self.top)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn expand_to_include(&mut self, other: &Bounds) {
        self.left = self.left.min(other.left);
        self.bottom = self.bottom.min(other.bottom);
        self.right = self.right.max(other.right);
        self.top = self.top.max(other.top);
    }

    pub fn with_margin(&self, margin_percent: f64) -> Self {
        let x_margin = self.width() * margin_percent;
        let y_margin = self.height() * margin_percent;
        Self {
            left: self.left - x_margin,
            bottom: self.bottom - y_margin,
            right: self.right + x_margin,
            top: self.top + y_margin,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.bottom && y <= self.top
    }

    /// Smallest extent enclosing every point, `None` for an empty iterator.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        points.into_iter().fold(None, |acc, (x, y)| match acc {
            None => Some(Self::new(x, y, x, y)),
            Some(mut bounds) => {
                bounds.expand_to_include(&Self::new(x, y, x, y));
                Some(bounds)
            }
        })
    }

    /// Union of several extents, `None` if there are none.
    pub fn union<'a, I>(bounds: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Bounds>,
    {
        bounds.into_iter().fold(None, |acc, b| match acc {
            None => Some(*b),
            Some(mut total) => {
                total.expand_to_include(b);
                Some(total)
            }
        })
    }
}

/// Descriptive metadata carried by every view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewMetadata {
    pub title: Option<String>,
    /// Style group key; layers sharing it cycle through one style list.
    pub style: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub legend_label: Option<String>,
}

/// Closed set of view kinds known to the renderer registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViewKind {
    SheetView,
    SheetPoints,
    SheetLines,
    SheetOverlay,
    CoordinateGrid,
    DataCurves,
    DataOverlay,
    DataGrid,
    GridLayout,
    Table,
    DataHistogram,
    Annotation,
}

impl ViewKind {
    /// Every view kind, used to check registry completeness.
    pub const ALL: [ViewKind; 12] = [
        ViewKind::SheetView,
        ViewKind::SheetPoints,
        ViewKind::SheetLines,
        ViewKind::SheetOverlay,
        ViewKind::CoordinateGrid,
        ViewKind::DataCurves,
        ViewKind::DataOverlay,
        ViewKind::DataGrid,
        ViewKind::GridLayout,
        ViewKind::Table,
        ViewKind::DataHistogram,
        ViewKind::Annotation,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            ViewKind::SheetView => "SheetView",
            ViewKind::SheetPoints => "SheetPoints",
            ViewKind::SheetLines => "SheetLines",
            ViewKind::SheetOverlay => "SheetOverlay",
            ViewKind::CoordinateGrid => "CoordinateGrid",
            ViewKind::DataCurves => "DataCurves",
            ViewKind::DataOverlay => "DataOverlay",
            ViewKind::DataGrid => "DataGrid",
            ViewKind::GridLayout => "GridLayout",
            ViewKind::Table => "TableView",
            ViewKind::DataHistogram => "DataHistogram",
            ViewKind::Annotation => "Annotation",
        }
    }

    /// Kinds that describe a spatial (sheet coordinate) view.
    pub const fn is_spatial(&self) -> bool {
        matches!(
            self,
            ViewKind::SheetView | ViewKind::SheetPoints | ViewKind::SheetLines | ViewKind::SheetOverlay
        )
    }

    /// Kinds that may appear as a layer of an overlay.
    pub const fn is_layer(&self) -> bool {
        matches!(
            self,
            ViewKind::SheetView
                | ViewKind::SheetPoints
                | ViewKind::SheetLines
                | ViewKind::DataCurves
                | ViewKind::DataHistogram
                | ViewKind::Table
                | ViewKind::Annotation
        )
    }

    /// Kinds that are containers of stacks rather than stack elements.
    pub const fn is_grid(&self) -> bool {
        matches!(
            self,
            ViewKind::GridLayout | ViewKind::CoordinateGrid | ViewKind::DataGrid
        )
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One immutable unit of data to be drawn.
#[derive(Debug, Clone)]
pub enum View {
    Sheet(SheetView),
    Points(SheetPoints),
    Lines(SheetLines),
    SheetOverlay(Overlay),
    Curves(DataCurves),
    DataOverlay(Overlay),
    Histogram(DataHistogram),
    Table(TableView),
    Annotation(Annotation),
}

impl View {
    pub const fn kind(&self) -> ViewKind {
        match self {
            View::Sheet(_) => ViewKind::SheetView,
            View::Points(_) => ViewKind::SheetPoints,
            View::Lines(_) => ViewKind::SheetLines,
            View::SheetOverlay(_) => ViewKind::SheetOverlay,
            View::Curves(_) => ViewKind::DataCurves,
            View::DataOverlay(_) => ViewKind::DataOverlay,
            View::Histogram(_) => ViewKind::DataHistogram,
            View::Table(_) => ViewKind::Table,
            View::Annotation(_) => ViewKind::Annotation,
        }
    }

    pub const fn metadata(&self) -> &ViewMetadata {
        match self {
            View::Sheet(v) => &v.metadata,
            View::Points(v) => &v.metadata,
            View::Lines(v) => &v.metadata,
            View::SheetOverlay(v) | View::DataOverlay(v) => &v.metadata,
            View::Curves(v) => &v.metadata,
            View::Histogram(v) => &v.metadata,
            View::Table(v) => &v.metadata,
            View::Annotation(v) => &v.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut ViewMetadata {
        match self {
            View::Sheet(v) => &mut v.metadata,
            View::Points(v) => &mut v.metadata,
            View::Lines(v) => &mut v.metadata,
            View::SheetOverlay(v) | View::DataOverlay(v) => &mut v.metadata,
            View::Curves(v) => &mut v.metadata,
            View::Histogram(v) => &mut v.metadata,
            View::Table(v) => &mut v.metadata,
            View::Annotation(v) => &mut v.metadata,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata().title.as_deref()
    }

    /// Style group key, defaulting to the kind name.
    pub fn style_group(&self) -> &str {
        self.metadata()
            .style
            .as_deref()
            .unwrap_or_else(|| self.kind().name())
    }

    /// Spatial or data extent of the view, if it has one.
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            View::Sheet(v) => Some(v.bounds()),
            View::Points(v) => Some(v.bounds()),
            View::Lines(v) => Some(v.bounds()),
            View::SheetOverlay(v) | View::DataOverlay(v) => v.bounds(),
            View::Curves(v) => v.lbrt(),
            View::Histogram(v) => v.lbrt(),
            View::Table(_) | View::Annotation(_) => None,
        }
    }

    /// The view restricted to its region of interest; kinds without one are
    /// returned unchanged.
    pub fn roi(&self) -> View {
        match self {
            View::Sheet(v) => View::Sheet(v.roi()),
            View::Points(v) => View::Points(v.roi()),
            View::Lines(v) => View::Lines(v.roi()),
            View::SheetOverlay(v) => View::SheetOverlay(v.roi()),
            View::DataOverlay(v) => View::DataOverlay(v.roi()),
            other => other.clone(),
        }
    }

    /// Set the title, returning the view for chaining.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata_mut().title = Some(title.into());
        self
    }

    /// Set the style group, returning the view for chaining.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.metadata_mut().style = Some(style.into());
        self
    }
}

macro_rules! impl_into_view {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for View {
                fn from(view: $ty) -> Self {
                    View::$variant(view)
                }
            }
        )*
    };
}

impl_into_view!(
    SheetView => Sheet,
    SheetPoints => Points,
    SheetLines => Lines,
    DataCurves => Curves,
    DataHistogram => Histogram,
    TableView => Table,
    Annotation => Annotation,
);

impl From<Overlay> for View {
    /// Overlays containing any spatial layer are sheet overlays; everything
    /// else is a data overlay.
    fn from(overlay: Overlay) -> Self {
        if overlay.is_spatial() {
            View::SheetOverlay(overlay)
        } else {
            View::DataOverlay(overlay)
        }
    }
}

/// Anything a renderer can be constructed over.
#[derive(Debug, Clone)]
pub enum Plottable {
    Stack(Stack),
    GridLayout(GridLayout),
    CoordinateGrid(CoordinateGrid),
    DataGrid(DataGrid),
}

impl Plottable {
    /// Declared kind used to resolve the renderer.
    pub fn kind(&self) -> ViewKind {
        match self {
            Plottable::Stack(stack) => stack.kind(),
            Plottable::GridLayout(_) => ViewKind::GridLayout,
            Plottable::CoordinateGrid(_) => ViewKind::CoordinateGrid,
            Plottable::DataGrid(_) => ViewKind::DataGrid,
        }
    }

    /// Unwrap the stack, failing if this is a grid container.
    pub fn into_stack(self, renderer: &'static str) -> DataViewResult<Stack> {
        match self {
            Plottable::Stack(stack) => Ok(stack),
            _ => Err(DataViewError::ContainerMismatch {
                renderer,
                expected: "views or stacks of views",
            }),
        }
    }

    /// Plot option lookup key: the style group of the top view, or the grid
    /// kind name.
    pub fn style_group(&self) -> String {
        match self {
            Plottable::Stack(stack) => stack.style_group().to_string(),
            other => other.kind().name().to_string(),
        }
    }

    /// The source restricted to its region of interest.
    pub fn roi(&self) -> Plottable {
        match self {
            Plottable::Stack(stack) => Plottable::Stack(stack.roi()),
            other => other.clone(),
        }
    }
}

impl From<Stack> for Plottable {
    fn from(stack: Stack) -> Self {
        Plottable::Stack(stack)
    }
}

impl From<View> for Plottable {
    fn from(view: View) -> Self {
        Plottable::Stack(Stack::from_view(view))
    }
}

impl From<GridLayout> for Plottable {
    fn from(grid: GridLayout) -> Self {
        Plottable::GridLayout(grid)
    }
}

impl From<CoordinateGrid> for Plottable {
    fn from(grid: CoordinateGrid) -> Self {
        Plottable::CoordinateGrid(grid)
    }
}

impl From<DataGrid> for Plottable {
    fn from(grid: DataGrid) -> Self {
        Plottable::DataGrid(grid)
    }
}

macro_rules! impl_into_plottable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Plottable {
                fn from(view: $ty) -> Self {
                    Plottable::from(View::from(view))
                }
            }
        )*
    };
}

impl_into_plottable!(
    SheetView,
    SheetPoints,
    SheetLines,
    Overlay,
    DataCurves,
    DataHistogram,
    TableView,
    Annotation,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_union_and_margin() {
        let a = Bounds::new(0.0, 0.0, 1.0, 1.0);
        let b = Bounds::new(-1.0, 0.5, 0.5, 2.0);
        let total = Bounds::union([&a, &b]).expect("two bounds");
        assert_eq!(total.lbrt(), (-1.0, 0.0, 1.0, 2.0));

        let padded = a.with_margin(0.1);
        assert_eq!(padded.lbrt(), (-0.1, -0.1, 1.1, 1.1));
        assert!(Bounds::union(std::iter::empty()).is_none());
    }

    #[test]
    fn test_enclosing_points() {
        let bounds = Bounds::enclosing([(1.0, 2.0), (-3.0, 4.0), (0.0, -1.0)]).expect("points");
        assert_eq!(bounds.lbrt(), (-3.0, -1.0, 1.0, 4.0));
    }

    #[test]
    fn test_style_group_defaults_to_kind_name() {
        let view = View::from(DataHistogram::new(vec![1.0], vec![0.0, 1.0]).expect("valid"));
        assert_eq!(view.style_group(), "DataHistogram");
        let view = view.with_style("Counts");
        assert_eq!(view.style_group(), "Counts");
    }

    #[test]
    fn test_bare_view_becomes_single_frame_stack() {
        let view = SheetView::new(ndarray::Array2::zeros((2, 2)), Bounds::new(0.0, 0.0, 1.0, 1.0));
        match Plottable::from(view) {
            Plottable::Stack(stack) => {
                assert_eq!(stack.len(), 1);
                assert_eq!(stack.dimension_labels(), &[DEFAULT_DIMENSION.to_string()]);
            }
            other => panic!("expected a stack, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_grid_is_not_a_stack() {
        let grid = GridLayout::new(1, 1);
        let err = Plottable::from(grid)
            .into_stack("SheetViewPlot")
            .expect_err("grids are containers");
        assert!(matches!(err, DataViewError::ContainerMismatch { .. }));
    }
}
