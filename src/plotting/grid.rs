//! Grid renderers: independent sub-plots, raster mosaics and data grids.

use super::{AxisDecor, DrawArgs, Plot, PlotContext, PlotResult, prepare_axes};
use crate::DataViewError;
use crate::figure::{AxesHandle, Figure, ImageHandle};
use crate::options::PlotSettings;
use crate::views::grid::coordinate_index;
use crate::views::{
    Bounds, CoordinateGrid, DataGrid, GridLayout, Plottable, SheetView, Stack, View, ViewKind,
};

/// Gap between sub-axes, in figure fractions.
const SUBPLOT_GAP: f64 = 0.02;

const RASTER_OPTIONS: &[&str] = &["alpha", "cmap", "interpolation", "visible", "filterrad", "origin"];

/// Rect of cell `(row, col)` in a uniform `rows × cols` split of `host`.
/// Row 0 is the top row.
pub(crate) fn cell_rect(host: [f64; 4], rows: usize, cols: usize, row: usize, col: usize) -> [f64; 4] {
    let [left, bottom, width, height] = host;
    let rows = rows.max(1);
    let cols = cols.max(1);
    let cell_w = ((width - SUBPLOT_GAP * (cols - 1) as f64) / cols as f64).max(0.0);
    let cell_h = ((height - SUBPLOT_GAP * (rows - 1) as f64) / rows as f64).max(0.0);
    let from_bottom = rows - 1 - row.min(rows - 1);
    [
        left + col as f64 * (cell_w + SUBPLOT_GAP),
        bottom + from_bottom as f64 * (cell_h + SUBPLOT_GAP),
        cell_w,
        cell_h,
    ]
}

/// Claim a hidden host axes spanning the whole grid.
fn host_axes(
    figure: &mut Figure,
    axes: Option<AxesHandle>,
    context: &PlotContext,
    title: Option<&str>,
) -> PlotResult<AxesHandle> {
    let host = prepare_axes(
        figure,
        axes,
        &context.settings,
        AxisDecor {
            title,
            owns_title: context.owns_title(),
            ..AxisDecor::default()
        },
    )?;
    figure.axes_mut(host)?.axis_visible = false;
    Ok(host)
}

struct GridCell {
    row: usize,
    col: usize,
    plot: Box<dyn Plot>,
}

impl std::fmt::Debug for GridCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridCell")
            .field("row", &self.row)
            .field("col", &self.col)
            .field("plot", &self.plot.name())
            .finish()
    }
}

fn render_cells(
    cells: &mut [GridCell],
    figure: &mut Figure,
    host: AxesHandle,
    shape: (usize, usize),
) -> PlotResult<()> {
    let rect = figure.axes(host)?.rect;
    for cell in cells {
        let sub = figure.add_axes(cell_rect(rect, shape.0, shape.1, cell.row, cell.col));
        cell.plot.render_into(figure, Some(sub), DrawArgs::default())?;
    }
    Ok(())
}

fn max_frames(cells: &[GridCell]) -> usize {
    cells.iter().map(|c| c.plot.frame_count()).max().unwrap_or(1).max(1)
}

fn unexpected(renderer: &'static str, expected: ViewKind, source: &Plottable) -> DataViewError {
    tracing::debug!(renderer, actual = %source.kind(), "rejecting non-grid frame source");
    DataViewError::ContainerMismatch {
        renderer,
        expected: expected.name(),
    }
}

/// Arranges independent sub-plots on a grid, each rendered by the registry
/// into its own axes.
#[derive(Debug)]
pub struct GridLayoutPlot {
    title: Option<String>,
    shape: (usize, usize),
    context: PlotContext,
    cells: Vec<GridCell>,
    host: Option<AxesHandle>,
}

impl GridLayoutPlot {
    pub const NAME: &'static str = "GridLayoutPlot";

    pub fn new(source: impl Into<Plottable>, context: PlotContext) -> PlotResult<Self> {
        let grid = match source.into() {
            Plottable::GridLayout(grid) => grid,
            other => return Err(unexpected(Self::NAME, ViewKind::GridLayout, &other)),
        };
        let cells = Self::build_cells(&grid, &context)?;
        Ok(Self {
            title: grid.title.clone(),
            shape: grid.shape(),
            context,
            cells,
            host: None,
        })
    }

    pub(crate) fn boxed(source: Plottable, context: PlotContext) -> PlotResult<Box<dyn Plot>> {
        Ok(Box::new(Self::new(source, context)?))
    }

    fn build_cells(grid: &GridLayout, context: &PlotContext) -> PlotResult<Vec<GridCell>> {
        let (rows, cols) = grid.shape();
        let mut cells = Vec::with_capacity(grid.len());
        for col in 0..cols {
            for row in 0..rows {
                let Some(item) = grid.get(row, col) else {
                    continue;
                };
                let item = if context.settings.roi {
                    item.roi()
                } else {
                    item.clone()
                };
                let settings = context
                    .options
                    .settings_for(&item.style_group(), &context.settings)?;
                let plot = context.registry.build(item, context.child(settings, 0))?;
                cells.push(GridCell { row, col, plot });
            }
        }
        Ok(cells)
    }

    /// `(row, col, renderer name)` of every sub-plot in build order.
    pub fn cell_renderers(&self) -> Vec<(usize, usize, &'static str)> {
        self.cells
            .iter()
            .map(|c| (c.row, c.col, c.plot.name()))
            .collect()
    }
}

impl Plot for GridLayoutPlot {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn settings(&self) -> &PlotSettings {
        &self.context.settings
    }

    fn frame_count(&self) -> usize {
        max_frames(&self.cells)
    }

    fn render_into(
        &mut self,
        figure: &mut Figure,
        axes: Option<AxesHandle>,
        _args: DrawArgs,
    ) -> PlotResult<AxesHandle> {
        let host = host_axes(figure, axes, &self.context, self.title.as_deref())?;
        render_cells(&mut self.cells, figure, host, self.shape)?;
        self.host = Some(host);
        Ok(host)
    }

    fn render_frame(&mut self, figure: &mut Figure, n: usize) -> PlotResult<()> {
        if self.host.is_none() {
            return Err(DataViewError::NotRendered(Self::NAME));
        }
        for cell in &mut self.cells {
            cell.plot.render_frame(figure, n)?;
        }
        Ok(())
    }
}

/// Raster frames of one coordinate grid cell.
#[derive(Debug)]
struct MosaicCell {
    row: usize,
    col: usize,
    frames: Vec<SheetView>,
    group: String,
    image: Option<ImageHandle>,
}

impl MosaicCell {
    fn from_stack(stack: &Stack, row: usize, col: usize) -> PlotResult<Self> {
        let mut frames = Vec::with_capacity(stack.len());
        for view in stack.values() {
            let sheet = match view {
                View::Sheet(sheet) => sheet,
                View::SheetOverlay(overlay) => match overlay.last() {
                    Some(View::Sheet(sheet)) => sheet,
                    _ => {
                        return Err(DataViewError::structure(
                            "coordinate grid overlays must end with a raster layer",
                        ));
                    }
                },
                other => {
                    return Err(DataViewError::structure(format!(
                        "coordinate grid cells must hold rasters, got {}",
                        other.kind()
                    )));
                }
            };
            frames.push(sheet.clone());
        }
        let group = match stack.top() {
            View::SheetOverlay(overlay) => overlay
                .layers()
                .first()
                .map_or(ViewKind::SheetView.name(), View::style_group)
                .to_string(),
            other => other.style_group().to_string(),
        };
        Ok(Self {
            row,
            col,
            frames,
            group,
            image: None,
        })
    }

    fn frame(&self, n: usize) -> &SheetView {
        &self.frames[n.min(self.frames.len() - 1)]
    }
}

/// Draws a coordinate grid of rasters as one mosaic on a single axes.
///
/// Columns follow the x coordinates in ascending order; within a column,
/// cells stack upwards in ascending y. Each column is as wide as its widest
/// cell and each row as tall as its tallest, with a border of
/// `settings.border` distributed between and around them.
#[derive(Debug)]
pub struct CoordinateGridPlot {
    title: Option<String>,
    context: PlotContext,
    cells: Vec<MosaicCell>,
    columns: Vec<f64>,
    host: Option<AxesHandle>,
}

impl CoordinateGridPlot {
    pub const NAME: &'static str = "CoordinateGridPlot";

    pub fn new(source: impl Into<Plottable>, context: PlotContext) -> PlotResult<Self> {
        let grid = match source.into() {
            Plottable::CoordinateGrid(grid) => grid,
            other => return Err(unexpected(Self::NAME, ViewKind::CoordinateGrid, &other)),
        };
        let (cells, columns) = Self::build_cells(&grid)?;
        Ok(Self {
            title: grid.title.clone(),
            context,
            cells,
            columns,
            host: None,
        })
    }

    pub(crate) fn boxed(source: Plottable, context: PlotContext) -> PlotResult<Box<dyn Plot>> {
        Ok(Box::new(Self::new(source, context)?))
    }

    fn build_cells(grid: &CoordinateGrid) -> PlotResult<(Vec<MosaicCell>, Vec<f64>)> {
        let mut columns: Vec<f64> = Vec::new();
        let mut cells = Vec::with_capacity(grid.len());
        let mut row = 0;
        for (key, stack) in grid.cells() {
            let x = key.values()[0];
            if columns.last().is_none_or(|last| last.total_cmp(&x).is_ne()) {
                columns.push(x);
                row = 0;
            }
            cells.push(MosaicCell::from_stack(stack, row, columns.len() - 1)?);
            row += 1;
        }
        Ok((cells, columns))
    }

    fn displayed<'a>(&self, view: &'a SheetView) -> std::borrow::Cow<'a, SheetView> {
        if self.context.settings.situate {
            std::borrow::Cow::Borrowed(view)
        } else {
            std::borrow::Cow::Owned(view.roi())
        }
    }

    /// Cell extents on the mosaic axes, in cell order, plus the total
    /// mosaic bounds.
    pub fn layout(&self) -> (Vec<Bounds>, Bounds) {
        let dims: Vec<(f64, f64)> = self
            .cells
            .iter()
            .map(|cell| {
                let view = cell.frame(usize::MAX);
                let b = if self.context.settings.situate {
                    view.bounds()
                } else {
                    view.roi_bounds()
                };
                (b.width(), b.height())
            })
            .collect();

        let cols = self.columns.len();
        let rows = self.cells.iter().map(|c| c.row + 1).max().unwrap_or(0);
        let mut col_widths = vec![0.0_f64; cols];
        let mut row_heights = vec![0.0_f64; rows];
        for (cell, (w, h)) in self.cells.iter().zip(&dims) {
            col_widths[cell.col] = col_widths[cell.col].max(*w);
            row_heights[cell.row] = row_heights[cell.row].max(*h);
        }

        let width: f64 = col_widths.iter().sum();
        let height: f64 = row_heights.iter().sum();
        let border = self.context.settings.border;
        let border_w = width * border / (cols + 1) as f64;
        let border_h = height * border / (rows + 1) as f64;

        let extents = self
            .cells
            .iter()
            .zip(&dims)
            .map(|(cell, (w, h))| {
                let left = border_w * (cell.col + 1) as f64 + col_widths[..cell.col].iter().sum::<f64>();
                let bottom = border_h * (cell.row + 1) as f64 + row_heights[..cell.row].iter().sum::<f64>();
                Bounds::new(left, bottom, left + w, bottom + h)
            })
            .collect();
        let total = Bounds::new(0.0, 0.0, width * (1.0 + border), height * (1.0 + border));
        (extents, total)
    }
}

impl Plot for CoordinateGridPlot {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn settings(&self) -> &PlotSettings {
        &self.context.settings
    }

    fn frame_count(&self) -> usize {
        self.cells.iter().map(|c| c.frames.len()).max().unwrap_or(1).max(1)
    }

    fn render_into(
        &mut self,
        figure: &mut Figure,
        axes: Option<AxesHandle>,
        _args: DrawArgs,
    ) -> PlotResult<AxesHandle> {
        let (extents, total) = self.layout();
        let precision = self.context.settings.float_precision;
        let mut centres: Vec<(usize, f64)> = self
            .cells
            .iter()
            .zip(&extents)
            .map(|(cell, extent)| (cell.col, (extent.left + extent.right) / 2.0))
            .collect();
        centres.sort_by_key(|(col, _)| *col);
        centres.dedup_by_key(|(col, _)| *col);
        let ticks = (
            centres.iter().map(|(_, x)| *x).collect(),
            centres
                .iter()
                .map(|(col, _)| format!("{:.precision$}", self.columns[*col]))
                .collect(),
        );

        let host = prepare_axes(
            figure,
            axes,
            &self.context.settings,
            AxisDecor {
                title: self.title.as_deref(),
                owns_title: self.context.owns_title(),
                lbrt: Some(total),
                xticks: Some(ticks),
                ..AxisDecor::default()
            },
        )?;

        let mut images = Vec::with_capacity(self.cells.len());
        for (cell, extent) in self.cells.iter().zip(extents) {
            let view = self.displayed(cell.frame(usize::MAX));
            let mut style = self.context.style(&cell.group, 0, RASTER_OPTIONS, Self::NAME);
            if view.depth() != 1 {
                style.remove("cmap");
            }
            let clim = super::sheet::raster_clim(&view);
            images.push(figure.add_image(host, view.data().clone(), extent, clim, style, self.context.zorder)?);
        }
        for (cell, image) in self.cells.iter_mut().zip(images) {
            cell.image = Some(image);
        }
        self.host = Some(host);
        Ok(host)
    }

    fn render_frame(&mut self, figure: &mut Figure, n: usize) -> PlotResult<()> {
        if self.host.is_none() {
            return Err(DataViewError::NotRendered(Self::NAME));
        }
        for cell in &self.cells {
            let image = cell.image.ok_or(DataViewError::NotRendered(Self::NAME))?;
            let view = self.displayed(cell.frame(n));
            figure.set_image_data(image, view.data().clone())?;
            figure.set_clim(image, super::sheet::raster_clim(&view))?;
        }
        Ok(())
    }
}

/// Arranges data plots on a grid indexed by distinct x and y coordinates,
/// each drawn without axes, legend or title.
#[derive(Debug)]
pub struct DataGridPlot {
    title: Option<String>,
    shape: (usize, usize),
    context: PlotContext,
    cells: Vec<GridCell>,
    host: Option<AxesHandle>,
}

impl DataGridPlot {
    pub const NAME: &'static str = "DataGridPlot";

    pub fn new(source: impl Into<Plottable>, context: PlotContext) -> PlotResult<Self> {
        let grid = match source.into() {
            Plottable::DataGrid(grid) => grid,
            other => return Err(unexpected(Self::NAME, ViewKind::DataGrid, &other)),
        };
        let (xs, ys) = grid.axes_values();
        let cells = Self::build_cells(&grid, &xs, &ys, &context)?;
        Ok(Self {
            title: grid.title.clone(),
            shape: (ys.len(), xs.len()),
            context,
            cells,
            host: None,
        })
    }

    pub(crate) fn boxed(source: Plottable, context: PlotContext) -> PlotResult<Box<dyn Plot>> {
        Ok(Box::new(Self::new(source, context)?))
    }

    fn build_cells(grid: &DataGrid, xs: &[f64], ys: &[f64], context: &PlotContext) -> PlotResult<Vec<GridCell>> {
        let base = PlotSettings {
            show_axes: false,
            show_legend: false,
            show_title: false,
            ..context.settings.clone()
        };
        let mut cells = Vec::with_capacity(grid.len());
        for (key, stack) in grid.cells() {
            let (x, y) = (key.values()[0], key.values()[1]);
            let (Some(col), Some(from_bottom)) = (coordinate_index(xs, x), coordinate_index(ys, y)) else {
                return Err(DataViewError::structure(format!("grid coordinate {key} is not on the grid axes")));
            };
            let settings = context.options.settings_for(stack.style_group(), &base)?;
            let plot = context
                .registry
                .build(Plottable::Stack(stack.clone()), context.child(settings, 0))?;
            cells.push(GridCell {
                row: ys.len() - 1 - from_bottom,
                col,
                plot,
            });
        }
        Ok(cells)
    }

    /// `(rows, cols)` of the grid.
    pub const fn shape(&self) -> (usize, usize) {
        self.shape
    }
}

impl Plot for DataGridPlot {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn settings(&self) -> &PlotSettings {
        &self.context.settings
    }

    fn frame_count(&self) -> usize {
        max_frames(&self.cells)
    }

    fn render_into(
        &mut self,
        figure: &mut Figure,
        axes: Option<AxesHandle>,
        _args: DrawArgs,
    ) -> PlotResult<AxesHandle> {
        let host = host_axes(figure, axes, &self.context, self.title.as_deref())?;
        render_cells(&mut self.cells, figure, host, self.shape)?;
        self.host = Some(host);
        Ok(host)
    }

    fn render_frame(&mut self, figure: &mut Figure, n: usize) -> PlotResult<()> {
        if self.host.is_none() {
            return Err(DataViewError::NotRendered(Self::NAME));
        }
        for cell in &mut self.cells {
            cell.plot.render_frame(figure, n)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{DataCurves, DataHistogram, TableView};
    use approx_eq::assert_approx_eq;
    use ndarray::{Array2, array};

    #[test]
    fn test_cell_rect() {
        let top_left = cell_rect([0.0, 0.0, 1.0, 1.0], 2, 2, 0, 0);
        assert_approx_eq!(top_left[0], 0.0, 1e-12);
        assert_approx_eq!(top_left[1], 0.51, 1e-12);
        assert_approx_eq!(top_left[2], 0.49, 1e-12);
        let bottom_right = cell_rect([0.0, 0.0, 1.0, 1.0], 2, 2, 1, 1);
        assert_approx_eq!(bottom_right[0], 0.51, 1e-12);
        assert_approx_eq!(bottom_right[1], 0.0, 1e-12);
    }

    #[test]
    fn test_layout_renders_each_cell_once() {
        let curves = DataCurves::new(vec![array![[0.0, 0.0], [1.0, 1.0]]]).expect("valid");
        let table = TableView::from_mapping(vec![("a", 1i64)]).expect("valid");
        let hist = Stack::from_items(
            vec!["time"],
            (0..3).map(|t| {
                (
                    t as f64,
                    DataHistogram::new(vec![t as f64], vec![0.0, 1.0]).expect("valid"),
                )
            }),
        )
        .expect("valid");
        let grid = GridLayout::new(2, 2).with(0, 0, curves).with(0, 1, table).with(1, 0, hist);

        let mut plot = GridLayoutPlot::new(grid, PlotContext::default()).expect("grid");
        assert_eq!(
            plot.cell_renderers(),
            vec![
                (0, 0, "DataCurvePlot"),
                (1, 0, "DataHistogramPlot"),
                (0, 1, "TablePlot")
            ]
        );
        assert_eq!(plot.frame_count(), 3);

        let mut figure = plot.render().expect("render");
        // host plus one axes per cell
        assert_eq!(figure.axes_count(), 4);
        plot.render_frame(&mut figure, 1).expect("frame");
    }

    #[test]
    fn test_coordinate_grid_mosaic() {
        let sheet = |size: f64, value: f64| {
            SheetView::new(
                Array2::from_elem((2, 2), value),
                Bounds::new(-size / 2.0, -size / 2.0, size / 2.0, size / 2.0),
            )
        };
        let mut grid = CoordinateGrid::new();
        grid.insert([0.0, 0.0], View::from(sheet(1.0, 1.0))).expect("cell");
        grid.insert([0.0, 1.0], View::from(sheet(2.0, 2.0))).expect("cell");
        grid.insert([1.0, 0.0], View::from(sheet(1.0, 3.0))).expect("cell");

        let settings = PlotSettings {
            situate: true,
            border: 0.0,
            ..PlotSettings::default()
        };
        let mut plot = CoordinateGridPlot::new(grid, PlotContext::default().with_settings(settings))
            .expect("grid");
        let (extents, total) = plot.layout();
        assert_eq!(total, Bounds::new(0.0, 0.0, 3.0, 3.0));
        assert_eq!(extents[1], Bounds::new(0.0, 1.0, 2.0, 3.0));
        assert_eq!(extents[2], Bounds::new(2.0, 0.0, 3.0, 1.0));

        let figure = plot.render().expect("render");
        assert_eq!(figure.primitive_count(), 3);
    }

    #[test]
    fn test_data_grid_hides_cell_decorations() {
        let mut grid = DataGrid::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
            let curve = DataCurves::new(vec![array![[0.0, x], [1.0, y]]])
                .expect("valid")
                .with_title("cell");
            grid.insert([x, y], View::from(curve)).expect("cell");
        }
        let mut plot = DataGridPlot::new(grid, PlotContext::default()).expect("grid");
        assert_eq!(plot.shape(), (2, 2));
        let figure = plot.render().expect("render");
        assert_eq!(figure.axes_count(), 4);
        for handle in figure.axes_handles().skip(1) {
            let axes = figure.axes(handle).expect("axes");
            assert!(!axes.axis_visible);
            assert_eq!(axes.title, None);
        }
    }

    #[test]
    fn test_wrong_container() {
        let curves = DataCurves::new(vec![array![[0.0, 0.0]]]).expect("valid");
        let err = GridLayoutPlot::new(curves.clone(), PlotContext::default()).expect_err("not a grid");
        assert!(matches!(
            err,
            DataViewError::ContainerMismatch { renderer: "GridLayoutPlot", expected: "GridLayout" }
        ));
        assert!(matches!(
            CoordinateGridPlot::new(curves.clone(), PlotContext::default()),
            Err(DataViewError::ContainerMismatch { .. })
        ));
        assert!(matches!(
            DataGridPlot::new(curves, PlotContext::default()),
            Err(DataViewError::ContainerMismatch { .. })
        ));
    }
}
