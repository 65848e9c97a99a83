//! Retained-mode figure scene.
//!
//! A [`Figure`] owns a set of axes and the primitives drawn on them. Callers
//! never hold references into the scene: every axes and primitive is
//! addressed by a small `Copy` handle, so renderers can cache handles from
//! the initial render and mutate the primitives they point at on every
//! later frame.
//!
//! With the `html` feature enabled a figure can be exported to an
//! interactive plotly document, see [`Figure::to_html`].

#[cfg(feature = "html")]
mod html;
pub mod primitives;

pub use primitives::{
    AxesHandle, BarsHandle, ColorbarHandle, ImageHandle, LinesHandle, Primitive, PrimitiveId,
    ScatterHandle, SpanHandle, SpanOrientation, TableCell, TableHandle, TextHandle,
};

use ndarray::Array3;

use crate::options::{Orientation, StyleOptions};
use crate::views::Bounds;
use crate::{DataViewError, DataViewResult};

/// Points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Axis decorations and the primitives drawn in one axes.
#[derive(Debug, Clone)]
pub struct Axes {
    /// `[left, bottom, width, height]` in figure fractions.
    pub rect: [f64; 4],
    pub title: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub xlim: Option<(f64, f64)>,
    pub ylim: Option<(f64, f64)>,
    pub xticks: Option<Vec<f64>>,
    pub xtick_labels: Option<Vec<String>>,
    pub axis_visible: bool,
    pub grid: bool,
    /// Legend entries, top to bottom.
    pub legend: Option<Vec<String>>,
    primitives: Vec<PrimitiveId>,
}

impl Axes {
    fn new(rect: [f64; 4]) -> Self {
        Self {
            rect,
            title: None,
            xlabel: None,
            ylabel: None,
            xlim: None,
            ylim: None,
            xticks: None,
            xtick_labels: None,
            axis_visible: true,
            grid: false,
            legend: None,
            primitives: Vec::new(),
        }
    }

    /// Primitives on this axes in insertion order.
    pub fn primitive_ids(&self) -> &[PrimitiveId] {
        &self.primitives
    }

    pub fn set_limits(&mut self, bounds: &Bounds) {
        self.xlim = Some((bounds.left, bounds.right));
        self.ylim = Some((bounds.bottom, bounds.top));
    }
}

#[derive(Debug, Clone)]
struct Slot {
    axes: AxesHandle,
    zorder: i32,
    primitive: Primitive,
}

/// A primitive slot plus the generation stamped on ids handed out for it.
#[derive(Debug, Clone)]
struct Entry {
    generation: u32,
    slot: Option<Slot>,
}

fn not_live(id: PrimitiveId) -> DataViewError {
    DataViewError::invalid_handle(format!("primitive {id} is not live"))
}

/// A figure: a canvas of a given size holding axes and primitives.
///
/// Removed primitives free their slot for reuse, so a figure whose
/// primitives are replaced on every frame stays bounded in size.
#[derive(Debug, Clone)]
pub struct Figure {
    size: (f64, f64),
    axes: Vec<Axes>,
    entries: Vec<Entry>,
    free: Vec<usize>,
}

impl Figure {
    /// Create an empty figure of `size` inches.
    pub fn new(size: (f64, f64)) -> Self {
        Self {
            size,
            axes: Vec::new(),
            entries: Vec::new(),
            free: Vec::new(),
        }
    }

    pub const fn size(&self) -> (f64, f64) {
        self.size
    }

    /// Add an axes covering `rect` (`[left, bottom, width, height]` in figure
    /// fractions).
    pub fn add_axes(&mut self, rect: [f64; 4]) -> AxesHandle {
        self.axes.push(Axes::new(rect));
        AxesHandle(self.axes.len() - 1)
    }

    /// Add an axes covering the whole figure.
    pub fn add_full_axes(&mut self) -> AxesHandle {
        self.add_axes([0.0, 0.0, 1.0, 1.0])
    }

    pub fn axes(&self, handle: AxesHandle) -> DataViewResult<&Axes> {
        self.axes
            .get(handle.0)
            .ok_or_else(|| DataViewError::invalid_handle(format!("no axes {}", handle.0)))
    }

    pub fn axes_mut(&mut self, handle: AxesHandle) -> DataViewResult<&mut Axes> {
        self.axes
            .get_mut(handle.0)
            .ok_or_else(|| DataViewError::invalid_handle(format!("no axes {}", handle.0)))
    }

    pub fn axes_handles(&self) -> impl Iterator<Item = AxesHandle> + '_ {
        (0..self.axes.len()).map(AxesHandle)
    }

    pub fn axes_count(&self) -> usize {
        self.axes.len()
    }

    /// Number of live primitives across all axes.
    pub fn primitive_count(&self) -> usize {
        self.entries.iter().filter(|e| e.slot.is_some()).count()
    }

    /// Number of primitive slots allocated, live or free.
    pub fn slot_capacity(&self) -> usize {
        self.entries.len()
    }

    fn push(&mut self, axes: AxesHandle, zorder: i32, primitive: Primitive) -> DataViewResult<PrimitiveId> {
        self.axes(axes)?;
        let slot = Slot {
            axes,
            zorder,
            primitive,
        };
        let id = match self.free.pop() {
            Some(index) => {
                let entry = &mut self.entries[index];
                entry.slot = Some(slot);
                PrimitiveId {
                    index,
                    generation: entry.generation,
                }
            }
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    slot: Some(slot),
                });
                PrimitiveId {
                    index: self.entries.len() - 1,
                    generation: 0,
                }
            }
        };
        self.axes_mut(axes)?.primitives.push(id);
        Ok(id)
    }

    fn slot(&self, id: PrimitiveId) -> Option<&Slot> {
        self.entries
            .get(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.slot.as_ref())
    }

    pub fn primitive(&self, id: PrimitiveId) -> DataViewResult<&Primitive> {
        self.slot(id).map(|slot| &slot.primitive).ok_or_else(|| not_live(id))
    }

    fn primitive_mut(&mut self, id: PrimitiveId) -> DataViewResult<&mut Primitive> {
        self.entries
            .get_mut(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.slot.as_mut())
            .map(|slot| &mut slot.primitive)
            .ok_or_else(|| not_live(id))
    }

    /// Axes and z-order of a live primitive.
    pub fn placement(&self, id: PrimitiveId) -> DataViewResult<(AxesHandle, i32)> {
        self.slot(id).map(|slot| (slot.axes, slot.zorder)).ok_or_else(|| not_live(id))
    }

    /// Live primitives on `axes`, in insertion order.
    pub fn primitives_on(&self, axes: AxesHandle) -> DataViewResult<Vec<(PrimitiveId, &Primitive)>> {
        Ok(self
            .axes(axes)?
            .primitives
            .iter()
            .filter_map(|id| self.primitive(*id).ok().map(|p| (*id, p)))
            .collect())
    }

    /// Remove a primitive from the scene and free its slot.
    pub fn remove(&mut self, id: impl Into<PrimitiveId>) -> DataViewResult<()> {
        let id = id.into();
        let entry = self
            .entries
            .get_mut(id.index)
            .filter(|entry| entry.generation == id.generation && entry.slot.is_some())
            .ok_or_else(|| not_live(id))?;
        let axes = entry.slot.take().map(|slot| slot.axes);
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.index);
        if let Some(axes) = axes.and_then(|a| self.axes.get_mut(a.0)) {
            axes.primitives.retain(|p| *p != id);
        }
        Ok(())
    }

    // Lines

    pub fn add_lines(
        &mut self,
        axes: AxesHandle,
        paths: Vec<Vec<[f64; 2]>>,
        label: Option<String>,
        style: StyleOptions,
        zorder: i32,
    ) -> DataViewResult<LinesHandle> {
        self.push(axes, zorder, Primitive::Lines { paths, label, style })
            .map(LinesHandle)
    }

    pub fn set_paths(&mut self, handle: LinesHandle, new_paths: Vec<Vec<[f64; 2]>>) -> DataViewResult<()> {
        match self.primitive_mut(handle.0)? {
            Primitive::Lines { paths, .. } => {
                *paths = new_paths;
                Ok(())
            }
            other => Err(wrong_kind("lines", other)),
        }
    }

    pub fn paths(&self, handle: LinesHandle) -> DataViewResult<&[Vec<[f64; 2]>]> {
        match self.primitive(handle.0)? {
            Primitive::Lines { paths, .. } => Ok(paths),
            other => Err(wrong_kind("lines", other)),
        }
    }

    // Scatter

    pub fn add_scatter(
        &mut self,
        axes: AxesHandle,
        offsets: Vec<[f64; 2]>,
        style: StyleOptions,
        zorder: i32,
    ) -> DataViewResult<ScatterHandle> {
        self.push(axes, zorder, Primitive::Scatter { offsets, style })
            .map(ScatterHandle)
    }

    pub fn set_offsets(&mut self, handle: ScatterHandle, new_offsets: Vec<[f64; 2]>) -> DataViewResult<()> {
        match self.primitive_mut(handle.0)? {
            Primitive::Scatter { offsets, .. } => {
                *offsets = new_offsets;
                Ok(())
            }
            other => Err(wrong_kind("scatter", other)),
        }
    }

    pub fn offsets(&self, handle: ScatterHandle) -> DataViewResult<&[[f64; 2]]> {
        match self.primitive(handle.0)? {
            Primitive::Scatter { offsets, .. } => Ok(offsets),
            other => Err(wrong_kind("scatter", other)),
        }
    }

    // Images

    pub fn add_image(
        &mut self,
        axes: AxesHandle,
        data: Array3<f64>,
        extent: Bounds,
        clim: (f64, f64),
        style: StyleOptions,
        zorder: i32,
    ) -> DataViewResult<ImageHandle> {
        self.push(
            axes,
            zorder,
            Primitive::Image {
                data,
                extent,
                clim,
                style,
            },
        )
        .map(ImageHandle)
    }

    pub fn set_image_data(&mut self, handle: ImageHandle, new_data: Array3<f64>) -> DataViewResult<()> {
        match self.primitive_mut(handle.0)? {
            Primitive::Image { data, .. } => {
                *data = new_data;
                Ok(())
            }
            other => Err(wrong_kind("image", other)),
        }
    }

    pub fn set_clim(&mut self, handle: ImageHandle, new_clim: (f64, f64)) -> DataViewResult<()> {
        match self.primitive_mut(handle.0)? {
            Primitive::Image { clim, .. } => {
                *clim = new_clim;
                Ok(())
            }
            other => Err(wrong_kind("image", other)),
        }
    }

    /// Image data and its display scale.
    pub fn image(&self, handle: ImageHandle) -> DataViewResult<(&Array3<f64>, (f64, f64))> {
        match self.primitive(handle.0)? {
            Primitive::Image { data, clim, .. } => Ok((data, *clim)),
            other => Err(wrong_kind("image", other)),
        }
    }

    // Bars

    pub fn add_bars(
        &mut self,
        axes: AxesHandle,
        lefts: Vec<f64>,
        widths: Vec<f64>,
        heights: Vec<f64>,
        style: StyleOptions,
        zorder: i32,
    ) -> DataViewResult<BarsHandle> {
        if lefts.len() != heights.len() || widths.len() != heights.len() {
            return Err(DataViewError::structure(format!(
                "bar set needs matching lengths, got {} lefts, {} widths, {} heights",
                lefts.len(),
                widths.len(),
                heights.len()
            )));
        }
        self.push(
            axes,
            zorder,
            Primitive::Bars {
                lefts,
                widths,
                heights,
                style,
            },
        )
        .map(BarsHandle)
    }

    pub fn bar_count(&self, handle: BarsHandle) -> DataViewResult<usize> {
        self.bars(handle).map(|(_, _, heights)| heights.len())
    }

    /// Replace every bar's geometry; the bar count must not change.
    pub fn set_bars(
        &mut self,
        handle: BarsHandle,
        new_lefts: Vec<f64>,
        new_widths: Vec<f64>,
        new_heights: Vec<f64>,
    ) -> DataViewResult<()> {
        match self.primitive_mut(handle.0)? {
            Primitive::Bars {
                lefts,
                widths,
                heights,
                ..
            } => {
                if new_heights.len() != heights.len()
                    || new_lefts.len() != heights.len()
                    || new_widths.len() != heights.len()
                {
                    return Err(DataViewError::structure(format!(
                        "cannot change a set of {} bars into {}",
                        heights.len(),
                        new_heights.len()
                    )));
                }
                *lefts = new_lefts;
                *widths = new_widths;
                *heights = new_heights;
                Ok(())
            }
            other => Err(wrong_kind("bars", other)),
        }
    }

    /// `(lefts, widths, heights)` of a bar set.
    pub fn bars(&self, handle: BarsHandle) -> DataViewResult<(&[f64], &[f64], &[f64])> {
        match self.primitive(handle.0)? {
            Primitive::Bars {
                lefts,
                widths,
                heights,
                ..
            } => Ok((lefts, widths, heights)),
            other => Err(wrong_kind("bars", other)),
        }
    }

    // Reference lines and text

    pub fn add_span(
        &mut self,
        axes: AxesHandle,
        orientation: SpanOrientation,
        value: f64,
        style: StyleOptions,
        zorder: i32,
    ) -> DataViewResult<SpanHandle> {
        self.push(
            axes,
            zorder,
            Primitive::Span {
                orientation,
                value,
                style,
            },
        )
        .map(SpanHandle)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_text(
        &mut self,
        axes: AxesHandle,
        text: impl Into<String>,
        xy: (f64, f64),
        offset: (f64, f64),
        arrowstyle: Option<String>,
        style: StyleOptions,
        zorder: i32,
    ) -> DataViewResult<TextHandle> {
        self.push(
            axes,
            zorder,
            Primitive::Text {
                text: text.into(),
                xy,
                offset,
                arrowstyle,
                style,
            },
        )
        .map(TextHandle)
    }

    pub fn set_text(&mut self, handle: TextHandle, new_text: impl Into<String>) -> DataViewResult<()> {
        match self.primitive_mut(handle.0)? {
            Primitive::Text { text, .. } => {
                *text = new_text.into();
                Ok(())
            }
            other => Err(wrong_kind("text", other)),
        }
    }

    pub fn text(&self, handle: TextHandle) -> DataViewResult<&str> {
        match self.primitive(handle.0)? {
            Primitive::Text { text, .. } => Ok(text),
            other => Err(wrong_kind("text", other)),
        }
    }

    // Tables

    pub fn add_table(
        &mut self,
        axes: AxesHandle,
        cells: Vec<Vec<TableCell>>,
        bbox: Bounds,
        font_size: f64,
    ) -> DataViewResult<TableHandle> {
        self.push(
            axes,
            0,
            Primitive::Table {
                cells,
                bbox,
                font_size,
            },
        )
        .map(TableHandle)
    }

    /// `(rows, cols)` of a table.
    pub fn table_shape(&self, handle: TableHandle) -> DataViewResult<(usize, usize)> {
        let cells = self.table_cells(handle)?;
        Ok((cells.len(), cells.first().map_or(0, Vec::len)))
    }

    pub fn table_cells(&self, handle: TableHandle) -> DataViewResult<&[Vec<TableCell>]> {
        match self.primitive(handle.0)? {
            Primitive::Table { cells, .. } => Ok(cells),
            other => Err(wrong_kind("table", other)),
        }
    }

    pub fn set_cell_text(
        &mut self,
        handle: TableHandle,
        row: usize,
        col: usize,
        text: impl Into<String>,
    ) -> DataViewResult<()> {
        match self.primitive_mut(handle.0)? {
            Primitive::Table { cells, .. } => {
                let cell = cells
                    .get_mut(row)
                    .and_then(|r| r.get_mut(col))
                    .ok_or_else(|| {
                        DataViewError::structure(format!("table has no cell ({row}, {col})"))
                    })?;
                cell.text = text.into();
                Ok(())
            }
            other => Err(wrong_kind("table", other)),
        }
    }

    pub fn table_font_size(&self, handle: TableHandle) -> DataViewResult<f64> {
        match self.primitive(handle.0)? {
            Primitive::Table { font_size, .. } => Ok(*font_size),
            other => Err(wrong_kind("table", other)),
        }
    }

    /// Shrink the table font from `max_font_size` until every cell's text
    /// fits its box, returning the chosen size.
    pub fn auto_font_size(&mut self, handle: TableHandle, max_font_size: f64) -> DataViewResult<f64> {
        let (axes, _) = self.placement(handle.0)?;
        let rect = self.axes(axes)?.rect;
        let (fig_w, fig_h) = self.size;
        match self.primitive_mut(handle.0)? {
            Primitive::Table {
                cells,
                bbox,
                font_size,
            } => {
                let rows = cells.len().max(1) as f64;
                let cols = cells.first().map_or(1, Vec::len).max(1) as f64;
                let cell_w = bbox.width() * rect[2] * fig_w * POINTS_PER_INCH / cols;
                let cell_h = bbox.height() * rect[3] * fig_h * POINTS_PER_INCH / rows;

                let mut size = max_font_size.min(cell_h / 1.5);
                for cell in cells.iter().flatten() {
                    let chars = cell.text.chars().count().max(1) as f64;
                    // Glyphs average roughly 0.6 em, plus one em of padding.
                    size = size.min(cell_w / (0.6 * chars + 1.0));
                }
                *font_size = size.max(1.0);
                Ok(*font_size)
            }
            other => Err(wrong_kind("table", other)),
        }
    }

    // Colour bars

    pub fn add_colorbar(
        &mut self,
        axes: AxesHandle,
        image: ImageHandle,
        orientation: Orientation,
    ) -> DataViewResult<ColorbarHandle> {
        let (_, clim) = self.image(image)?;
        self.push(
            axes,
            0,
            Primitive::Colorbar {
                image,
                orientation,
                clim,
                visible: true,
            },
        )
        .map(ColorbarHandle)
    }

    /// Update the bar's scale and visibility.
    pub fn set_colorbar(&mut self, handle: ColorbarHandle, new_clim: (f64, f64), show: bool) -> DataViewResult<()> {
        match self.primitive_mut(handle.0)? {
            Primitive::Colorbar { clim, visible, .. } => {
                *clim = new_clim;
                *visible = show;
                Ok(())
            }
            other => Err(wrong_kind("colorbar", other)),
        }
    }

    /// `(clim, visible)` of a colour bar.
    pub fn colorbar(&self, handle: ColorbarHandle) -> DataViewResult<((f64, f64), bool)> {
        match self.primitive(handle.0)? {
            Primitive::Colorbar { clim, visible, .. } => Ok((*clim, *visible)),
            other => Err(wrong_kind("colorbar", other)),
        }
    }

    // Legends

    /// Labels of the labelled primitives on `axes`, in draw order.
    pub fn legend_labels(&self, axes: AxesHandle) -> DataViewResult<Vec<String>> {
        Ok(self
            .primitives_on(axes)?
            .into_iter()
            .filter_map(|(_, p)| p.label().map(str::to_string))
            .collect())
    }

    pub fn set_legend(&mut self, axes: AxesHandle, entries: Vec<String>) -> DataViewResult<()> {
        self.axes_mut(axes)?.legend = Some(entries);
        Ok(())
    }
}

fn wrong_kind(expected: &str, actual: &Primitive) -> DataViewError {
    DataViewError::invalid_handle(format!(
        "expected a {expected} primitive, found {}",
        actual.kind_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_typed_access() {
        let mut figure = Figure::new((5.0, 5.0));
        let axes = figure.add_full_axes();
        let lines = figure
            .add_lines(axes, vec![vec![[0.0, 0.0], [1.0, 1.0]]], None, StyleOptions::new(), 0)
            .expect("lines");
        figure.set_paths(lines, vec![]).expect("set paths");
        assert!(figure.paths(lines).expect("paths").is_empty());

        let text = figure
            .add_text(axes, "a", (0.0, 0.0), (0.0, 0.0), None, StyleOptions::new(), 0)
            .expect("text");
        let err = figure
            .set_paths(LinesHandle(text.id()), vec![])
            .expect_err("text is not lines");
        assert!(matches!(err, DataViewError::InvalidHandle(_)));
    }

    #[test]
    fn test_remove() {
        let mut figure = Figure::new((5.0, 5.0));
        let axes = figure.add_full_axes();
        let span = figure
            .add_span(axes, SpanOrientation::Vertical, 1.0, StyleOptions::new(), 0)
            .expect("span");
        assert_eq!(figure.primitive_count(), 1);
        figure.remove(span).expect("live");
        assert_eq!(figure.primitive_count(), 0);
        assert!(figure.remove(span).is_err());
        assert!(figure.primitives_on(axes).expect("axes").is_empty());
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut figure = Figure::new((5.0, 5.0));
        let axes = figure.add_full_axes();
        let first = figure
            .add_span(axes, SpanOrientation::Horizontal, 0.5, StyleOptions::new(), 0)
            .expect("span");
        for _ in 0..100 {
            let old = figure.primitives_on(axes).expect("axes")[0].0;
            figure.remove(old).expect("live");
            figure
                .add_span(axes, SpanOrientation::Horizontal, 0.5, StyleOptions::new(), 0)
                .expect("span");
        }
        assert_eq!(figure.slot_capacity(), 1);
        assert_eq!(figure.primitive_count(), 1);

        // The original id addresses the same slot but an older generation.
        assert!(figure.primitive(first.id()).is_err());
        assert!(figure.remove(first).is_err());
        assert_eq!(figure.primitive_count(), 1);
    }

    #[test]
    fn test_bar_count_is_fixed() {
        let mut figure = Figure::new((5.0, 5.0));
        let axes = figure.add_full_axes();
        let bars = figure
            .add_bars(axes, vec![0.0, 1.0], vec![1.0, 1.0], vec![2.0, 3.0], StyleOptions::new(), 0)
            .expect("bars");
        assert!(figure.set_bars(bars, vec![0.0], vec![1.0], vec![5.0]).is_err());
        assert_eq!(figure.bars(bars).expect("bars").2, &[2.0, 3.0]);
    }

    #[test]
    fn test_auto_font_size_shrinks_for_long_text() {
        let mut figure = Figure::new((5.0, 5.0));
        let axes = figure.add_full_axes();
        let cell = |text: &str| TableCell {
            text: text.to_string(),
            bold: false,
            monospace: false,
        };
        let table = figure
            .add_table(axes, vec![vec![cell("a"), cell("b")]], Bounds::new(0.0, 0.0, 1.0, 1.0), 20.0)
            .expect("table");
        assert_approx_eq!(figure.auto_font_size(table, 20.0).expect("table"), 20.0, 1e-9);

        figure
            .set_cell_text(table, 0, 1, "a very long cell value indeed")
            .expect("cell");
        let size = figure.auto_font_size(table, 20.0).expect("table");
        assert!(size < 20.0);
        assert!(figure.set_cell_text(table, 3, 0, "x").is_err());
    }
}
