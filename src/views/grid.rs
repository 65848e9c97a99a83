//! Grid containers mapping discrete 2-D coordinates to frame sources.

use std::collections::BTreeMap;

use super::{Bounds, Key, Plottable, Stack, ViewKind};
use crate::{DataViewError, DataViewResult};

/// Independent sub-plots arranged on a `rows × cols` grid.
///
/// Cell `(0, 0)` is the top-left position.
#[derive(Debug, Clone)]
pub struct GridLayout {
    rows: usize,
    cols: usize,
    cells: BTreeMap<(usize, usize), Plottable>,
    pub title: Option<String>,
}

impl GridLayout {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: BTreeMap::new(),
            title: None,
        }
    }

    /// Place a frame source at `(row, col)`, growing the grid if needed.
    pub fn insert(&mut self, row: usize, col: usize, item: impl Into<Plottable>) {
        self.rows = self.rows.max(row + 1);
        self.cols = self.cols.max(col + 1);
        self.cells.insert((row, col), item.into());
    }

    pub fn with(mut self, row: usize, col: usize, item: impl Into<Plottable>) -> Self {
        self.insert(row, col, item);
        self
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Plottable> {
        self.cells.get(&(row, col))
    }

    /// `(rows, cols)`.
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Occupied cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (&(usize, usize), &Plottable)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

fn check_coordinate(coord: &Key) -> DataViewResult<()> {
    if coord.len() != 2 {
        return Err(DataViewError::invalid_parameter(
            "coordinate",
            format!("grid coordinates are (x, y) pairs, got {coord}"),
        ));
    }
    Ok(())
}

/// Spatial stacks placed at `(x, y)` coordinates and packed onto one axis.
///
/// Every cell holds a stack of rasters or raster overlays.
#[derive(Debug, Clone, Default)]
pub struct CoordinateGrid {
    cells: BTreeMap<Key, Stack>,
    pub title: Option<String>,
}

impl CoordinateGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, coord: impl Into<Key>, item: impl Into<Stack>) -> DataViewResult<()> {
        let coord = coord.into();
        check_coordinate(&coord)?;
        let stack = item.into();
        if !matches!(stack.kind(), ViewKind::SheetView | ViewKind::SheetOverlay) {
            return Err(DataViewError::structure(format!(
                "coordinate grid cells must hold rasters or raster overlays, got {}",
                stack.kind()
            )));
        }
        self.cells.insert(coord, stack);
        Ok(())
    }

    pub fn get(&self, coord: impl Into<Key>) -> Option<&Stack> {
        self.cells.get(&coord.into())
    }

    /// Cells ordered by `(x, y)`.
    pub fn cells(&self) -> impl Iterator<Item = (&Key, &Stack)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Distinct x and y coordinates, each ascending.
    pub fn axes_values(&self) -> (Vec<f64>, Vec<f64>) {
        distinct_axes(self.cells.keys())
    }

    /// Spatial extent of a cell's top view.
    pub fn cell_bounds(&self, coord: impl Into<Key>) -> Option<Bounds> {
        self.get(coord).and_then(Stack::bounds)
    }
}

/// Data stacks (curves, histograms, tables, overlays) keyed by `(x, y)`.
#[derive(Debug, Clone, Default)]
pub struct DataGrid {
    cells: BTreeMap<Key, Stack>,
    pub title: Option<String>,
}

impl DataGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, coord: impl Into<Key>, item: impl Into<Stack>) -> DataViewResult<()> {
        let coord = coord.into();
        check_coordinate(&coord)?;
        let stack = item.into();
        if stack.kind().is_spatial() || stack.kind().is_grid() {
            return Err(DataViewError::structure(format!(
                "data grid cells must hold data views, got {}",
                stack.kind()
            )));
        }
        self.cells.insert(coord, stack);
        Ok(())
    }

    pub fn get(&self, coord: impl Into<Key>) -> Option<&Stack> {
        self.cells.get(&coord.into())
    }

    pub fn cells(&self) -> impl Iterator<Item = (&Key, &Stack)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Distinct x and y coordinates, each ascending.
    pub fn axes_values(&self) -> (Vec<f64>, Vec<f64>) {
        distinct_axes(self.cells.keys())
    }
}

fn distinct_axes<'a>(keys: impl Iterator<Item = &'a Key>) -> (Vec<f64>, Vec<f64>) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for key in keys {
        let values = key.values();
        xs.push(values[0]);
        ys.push(values[1]);
    }
    for axis in [&mut xs, &mut ys] {
        axis.sort_by(f64::total_cmp);
        axis.dedup();
    }
    (xs, ys)
}

/// Position of `value` in an ascending list of distinct coordinates.
pub(crate) fn coordinate_index(values: &[f64], value: f64) -> Option<usize> {
    values.iter().position(|v| v.total_cmp(&value).is_eq())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{DataCurves, SheetView, View};
    use ndarray::{Array2, array};

    fn sheet() -> SheetView {
        SheetView::new(Array2::zeros((2, 2)), Bounds::new(0.0, 0.0, 1.0, 1.0))
    }

    #[test]
    fn test_grid_layout_grows() {
        let mut grid = GridLayout::new(1, 1);
        grid.insert(2, 1, sheet());
        assert_eq!(grid.shape(), (3, 2));
        assert!(grid.get(2, 1).is_some());
        assert!(grid.get(0, 0).is_none());
    }

    #[test]
    fn test_coordinate_grid_validates_cells() {
        let mut grid = CoordinateGrid::new();
        grid.insert([0.0, 0.0], Stack::from(View::from(sheet()))).expect("raster cell");
        let curves = DataCurves::new(vec![array![[0.0, 1.0]]]).expect("valid");
        assert!(grid.insert([1.0, 0.0], Stack::from(View::from(curves))).is_err());
        assert!(grid.insert([1.0], Stack::from(View::from(sheet()))).is_err());
    }

    #[test]
    fn test_data_grid_axes() {
        let curves = DataCurves::new(vec![array![[0.0, 1.0]]]).expect("valid");
        let mut grid = DataGrid::new();
        for coord in [[1.0, 0.0], [0.0, 0.0], [1.0, 2.0]] {
            grid.insert(coord, Stack::from(View::from(curves.clone()))).expect("data cell");
        }
        let (xs, ys) = grid.axes_values();
        assert_eq!(xs, vec![0.0, 1.0]);
        assert_eq!(ys, vec![0.0, 2.0]);
        assert_eq!(coordinate_index(&ys, 2.0), Some(1));
        assert!(grid.insert([0.0, 1.0], Stack::from(View::from(sheet()))).is_err());
    }
}
