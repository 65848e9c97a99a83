//! Mapping from view kinds to renderer constructors.

use std::collections::BTreeMap;

use super::{
    AnnotationPlot, CoordinateGridPlot, DataCurvePlot, DataGridPlot, DataHistogramPlot,
    GridLayoutPlot, OverlayPlot, Plot, PlotContext, PlotResult, SheetLinesPlot, SheetPointsPlot,
    SheetViewPlot, TablePlot,
};
use crate::DataViewError;
use crate::views::{Plottable, ViewKind};

/// Builds a boxed renderer for a frame source.
pub type PlotConstructor = fn(Plottable, PlotContext) -> PlotResult<Box<dyn Plot>>;

/// Table resolving each [`ViewKind`] to the renderer that draws it.
///
/// Composite renderers resolve their children through the registry carried
/// in their [`PlotContext`], so registering a replacement constructor
/// changes how that kind is drawn everywhere, including inside overlays and
/// grids.
#[derive(Debug, Clone, Default)]
pub struct PlotRegistry {
    entries: BTreeMap<ViewKind, PlotConstructor>,
}

impl PlotRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in renderer for every view kind.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(ViewKind::SheetView, SheetViewPlot::boxed);
        registry.register(ViewKind::SheetPoints, SheetPointsPlot::boxed);
        registry.register(ViewKind::SheetLines, SheetLinesPlot::boxed);
        registry.register(ViewKind::SheetOverlay, OverlayPlot::boxed);
        registry.register(ViewKind::CoordinateGrid, CoordinateGridPlot::boxed);
        registry.register(ViewKind::DataCurves, DataCurvePlot::boxed);
        registry.register(ViewKind::DataOverlay, OverlayPlot::boxed);
        registry.register(ViewKind::DataGrid, DataGridPlot::boxed);
        registry.register(ViewKind::GridLayout, GridLayoutPlot::boxed);
        registry.register(ViewKind::Table, TablePlot::boxed);
        registry.register(ViewKind::DataHistogram, DataHistogramPlot::boxed);
        registry.register(ViewKind::Annotation, AnnotationPlot::boxed);
        registry
    }

    /// Register `constructor` for `kind`, returning the one it replaces.
    pub fn register(&mut self, kind: ViewKind, constructor: PlotConstructor) -> Option<PlotConstructor> {
        self.entries.insert(kind, constructor)
    }

    pub fn get(&self, kind: ViewKind) -> Option<PlotConstructor> {
        self.entries.get(&kind).copied()
    }

    /// Construct the renderer for `source`'s declared kind.
    pub fn build(&self, source: Plottable, context: PlotContext) -> PlotResult<Box<dyn Plot>> {
        let kind = source.kind();
        let constructor = self.get(kind).ok_or_else(|| {
            DataViewError::invalid_parameter("kind", format!("no renderer registered for {kind}"))
        })?;
        tracing::trace!(%kind, "resolving renderer");
        constructor(source, context)
    }

    /// Fail with the kinds that have no renderer, if any.
    pub fn check_complete(&self) -> PlotResult<()> {
        let missing: Vec<&str> = ViewKind::ALL
            .iter()
            .filter(|kind| !self.entries.contains_key(*kind))
            .map(ViewKind::name)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DataViewError::invalid_parameter(
                "registry",
                format!("no renderer for {}", missing.join(", ")),
            ))
        }
    }
}
