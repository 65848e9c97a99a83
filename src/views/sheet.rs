//! Spatial views in sheet coordinates: rasters, point sets and line collections.

use ndarray::{Array2, Array3, Axis, s};

use super::{Bounds, ViewMetadata};
use crate::{DataViewError, DataViewResult};

/// A 2-D field (or multi-channel image) covering a rectangular extent.
///
/// Data is stored as `(rows, cols, depth)`; scalar fields have depth 1.
/// Row 0 is the top of the extent.
#[derive(Debug, Clone)]
pub struct SheetView {
    data: Array3<f64>,
    bounds: Bounds,
    cyclic_range: Option<f64>,
    roi_bounds: Option<Bounds>,
    pub metadata: ViewMetadata,
}

impl SheetView {
    pub fn new(data: Array2<f64>, bounds: Bounds) -> Self {
        Self {
            data: data.insert_axis(Axis(2)),
            bounds,
            cyclic_range: None,
            roi_bounds: None,
            metadata: ViewMetadata::default(),
        }
    }

    /// An RGB or RGBA image.
    pub fn rgb(data: Array3<f64>, bounds: Bounds) -> DataViewResult<Self> {
        let depth = data.shape()[2];
        if depth != 3 && depth != 4 {
            return Err(DataViewError::invalid_parameter(
                "data",
                format!("an image needs 3 or 4 channels, got {depth}"),
            ));
        }
        Ok(Self {
            data,
            bounds,
            cyclic_range: None,
            roi_bounds: None,
            metadata: ViewMetadata::default(),
        })
    }

    /// Declare the values cyclic over `[0, range)`; the range then fixes the
    /// display scale.
    pub fn with_cyclic_range(mut self, range: f64) -> Self {
        self.cyclic_range = Some(range);
        self
    }

    pub fn with_roi(mut self, roi: Bounds) -> Self {
        self.roi_bounds = Some(roi);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.metadata.style = Some(style.into());
        self
    }

    pub const fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub const fn cyclic_range(&self) -> Option<f64> {
        self.cyclic_range
    }

    pub fn depth(&self) -> usize {
        self.data.shape()[2]
    }

    /// `(rows, cols)` of the field.
    pub fn shape(&self) -> (usize, usize) {
        (self.data.shape()[0], self.data.shape()[1])
    }

    /// Largest finite value, `0.0` for an empty or all-NaN field.
    pub fn max(&self) -> f64 {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
            .unwrap_or(0.0)
    }

    /// Extent of the region of interest, the full bounds if none is set.
    pub fn roi_bounds(&self) -> Bounds {
        self.roi_bounds.unwrap_or(self.bounds)
    }

    /// The field cropped to its region of interest.
    pub fn roi(&self) -> SheetView {
        let Some(roi) = self.roi_bounds else {
            return self.clone();
        };
        let (rows, cols) = self.shape();
        let (l, b, r, t) = self.bounds.lbrt();
        let (width, height) = (r - l, t - b);
        if rows == 0 || cols == 0 || width <= 0.0 || height <= 0.0 {
            return self.clone();
        }

        let to_col = |x: f64| ((x - l) / width * cols as f64).clamp(0.0, cols as f64);
        let to_row = |y: f64| ((t - y) / height * rows as f64).clamp(0.0, rows as f64);
        let c0 = to_col(roi.left).floor() as usize;
        let c1 = (to_col(roi.right).ceil() as usize).max(c0);
        let r0 = to_row(roi.top).floor() as usize;
        let r1 = (to_row(roi.bottom).ceil() as usize).max(r0);

        SheetView {
            data: self.data.slice(s![r0..r1, c0..c1, ..]).to_owned(),
            bounds: roi,
            cyclic_range: self.cyclic_range,
            roi_bounds: None,
            metadata: self.metadata.clone(),
        }
    }
}

fn check_coordinates(name: &str, data: &Array2<f64>) -> DataViewResult<()> {
    if data.ncols() != 2 {
        return Err(DataViewError::invalid_parameter(
            name,
            format!("expected an N×2 coordinate array, got {} columns", data.ncols()),
        ));
    }
    Ok(())
}

/// A set of points in sheet coordinates.
#[derive(Debug, Clone)]
pub struct SheetPoints {
    data: Array2<f64>,
    bounds: Bounds,
    roi_bounds: Option<Bounds>,
    pub metadata: ViewMetadata,
}

impl SheetPoints {
    pub fn new(data: Array2<f64>, bounds: Bounds) -> DataViewResult<Self> {
        check_coordinates("data", &data)?;
        Ok(Self {
            data,
            bounds,
            roi_bounds: None,
            metadata: ViewMetadata::default(),
        })
    }

    pub fn with_roi(mut self, roi: Bounds) -> Self {
        self.roi_bounds = Some(roi);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.metadata.style = Some(style.into());
        self
    }

    pub const fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Point coordinates as `[x, y]` pairs.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.data.rows().into_iter().map(|row| [row[0], row[1]]).collect()
    }

    /// Only the points inside the region of interest.
    pub fn roi(&self) -> SheetPoints {
        let Some(roi) = self.roi_bounds else {
            return self.clone();
        };
        let kept: Vec<f64> = self
            .data
            .rows()
            .into_iter()
            .filter(|row| roi.contains(row[0], row[1]))
            .flat_map(|row| [row[0], row[1]])
            .collect();
        let n = kept.len() / 2;
        SheetPoints {
            data: Array2::from_shape_vec((n, 2), kept).unwrap_or_else(|_| Array2::zeros((0, 2))),
            bounds: roi,
            roi_bounds: None,
            metadata: self.metadata.clone(),
        }
    }
}

/// A collection of polylines (e.g. contours) in sheet coordinates.
#[derive(Debug, Clone)]
pub struct SheetLines {
    data: Vec<Array2<f64>>,
    bounds: Bounds,
    roi_bounds: Option<Bounds>,
    pub metadata: ViewMetadata,
}

impl SheetLines {
    pub fn new(data: Vec<Array2<f64>>, bounds: Bounds) -> DataViewResult<Self> {
        for line in &data {
            check_coordinates("data", line)?;
        }
        Ok(Self {
            data,
            bounds,
            roi_bounds: None,
            metadata: ViewMetadata::default(),
        })
    }

    pub fn with_roi(mut self, roi: Bounds) -> Self {
        self.roi_bounds = Some(roi);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.metadata.style = Some(style.into());
        self
    }

    pub fn data(&self) -> &[Array2<f64>] {
        &self.data
    }

    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn paths(&self) -> Vec<Vec<[f64; 2]>> {
        self.data.iter().map(to_path).collect()
    }

    /// The lines re-bounded to the region of interest; the axis limits do
    /// the clipping.
    pub fn roi(&self) -> SheetLines {
        let mut lines = self.clone();
        if let Some(roi) = self.roi_bounds {
            lines.bounds = roi;
            lines.roi_bounds = None;
        }
        lines
    }
}

/// Convert an N×2 array into a list of `[x, y]` vertices.
pub(crate) fn to_path(data: &Array2<f64>) -> Vec<[f64; 2]> {
    data.rows().into_iter().map(|row| [row[0], row[1]]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_max_ignores_nan() {
        let view = SheetView::new(array![[0.0, f64::NAN], [3.0, 1.0]], Bounds::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(view.max(), 3.0);
        assert_eq!(view.depth(), 1);
    }

    #[test]
    fn test_roi_crops_field() {
        let data = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c) as f64);
        let view = SheetView::new(data, Bounds::new(0.0, 0.0, 1.0, 1.0))
            .with_roi(Bounds::new(0.0, 0.5, 0.5, 1.0));

        let roi = view.roi();
        assert_eq!(roi.shape(), (2, 2));
        assert_eq!(roi.bounds().lbrt(), (0.0, 0.5, 0.5, 1.0));
        // Top-left quadrant.
        assert_eq!(roi.data()[[0, 0, 0]], 0.0);
        assert_eq!(roi.data()[[1, 1, 0]], 5.0);
    }

    #[test]
    fn test_rgb_requires_channels() {
        let bad = Array3::zeros((2, 2, 2));
        assert!(SheetView::rgb(bad, Bounds::new(0.0, 0.0, 1.0, 1.0)).is_err());
        let good = Array3::zeros((2, 2, 3));
        let view = SheetView::rgb(good, Bounds::new(0.0, 0.0, 1.0, 1.0)).expect("rgb");
        assert_eq!(view.depth(), 3);
    }

    #[test]
    fn test_points_roi_filters() {
        let points = SheetPoints::new(array![[0.1, 0.1], [0.9, 0.9]], Bounds::new(0.0, 0.0, 1.0, 1.0))
            .expect("valid")
            .with_roi(Bounds::new(0.0, 0.0, 0.5, 0.5));
        assert_eq!(points.roi().points(), vec![[0.1, 0.1]]);
    }

    #[test]
    fn test_lines_require_two_columns() {
        let bad = SheetLines::new(vec![array![[0.0, 1.0, 2.0]]], Bounds::new(0.0, 0.0, 1.0, 1.0));
        assert!(bad.is_err());
    }
}
