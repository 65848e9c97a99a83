//! Non-spatial data views: curves and histograms.

use ndarray::Array2;

use super::{Bounds, ViewMetadata};
use crate::{DataViewError, DataViewResult};

/// One or more curves mapping a coordinate to a value.
///
/// Each curve is an N×2 array of `(x, y)` samples. When `cyclic_range` is
/// set the x-domain wraps around, e.g. an orientation over `[0, π)`.
#[derive(Debug, Clone)]
pub struct DataCurves {
    data: Vec<Array2<f64>>,
    cyclic_range: Option<f64>,
    pub metadata: ViewMetadata,
}

impl DataCurves {
    pub fn new(data: Vec<Array2<f64>>) -> DataViewResult<Self> {
        if data.is_empty() {
            return Err(DataViewError::invalid_parameter(
                "data",
                "at least one curve is required",
            ));
        }
        for curve in &data {
            if curve.ncols() != 2 || curve.nrows() == 0 {
                return Err(DataViewError::invalid_parameter(
                    "data",
                    format!(
                        "each curve must be a non-empty N×2 array, got {}×{}",
                        curve.nrows(),
                        curve.ncols()
                    ),
                ));
            }
        }
        Ok(Self {
            data,
            cyclic_range: None,
            metadata: ViewMetadata::default(),
        })
    }

    pub fn with_cyclic_range(mut self, range: f64) -> Self {
        self.cyclic_range = Some(range);
        self
    }

    pub fn with_labels(mut self, xlabel: impl Into<String>, ylabel: impl Into<String>) -> Self {
        self.metadata.xlabel = Some(xlabel.into());
        self.metadata.ylabel = Some(ylabel.into());
        self
    }

    pub fn with_legend_label(mut self, label: impl Into<String>) -> Self {
        self.metadata.legend_label = Some(label.into());
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

    pub const fn cyclic_range(&self) -> Option<f64> {
        self.cyclic_range
    }

    /// Extent of all samples.
    pub fn lbrt(&self) -> Option<Bounds> {
        Bounds::enclosing(
            self.data
                .iter()
                .flat_map(|curve| curve.rows().into_iter().map(|row| (row[0], row[1]))),
        )
    }

    /// x values of the first curve.
    pub fn xvalues(&self) -> Vec<f64> {
        self.data
            .first()
            .map(|curve| curve.column(0).to_vec())
            .unwrap_or_default()
    }
}

/// Counts over contiguous bins.
///
/// `edges` holds `bins + 1` values; bar `i` spans `edges[i]..edges[i + 1]`.
#[derive(Debug, Clone)]
pub struct DataHistogram {
    hist: Vec<f64>,
    edges: Vec<f64>,
    pub metadata: ViewMetadata,
}

impl DataHistogram {
    pub fn new(hist: Vec<f64>, edges: Vec<f64>) -> DataViewResult<Self> {
        if edges.len() != hist.len() + 1 {
            return Err(DataViewError::invalid_parameter(
                "edges",
                format!(
                    "{} bins need {} edges, got {}",
                    hist.len(),
                    hist.len() + 1,
                    edges.len()
                ),
            ));
        }
        if edges.windows(2).any(|w| w[1] < w[0]) {
            return Err(DataViewError::invalid_parameter(
                "edges",
                "bin edges must be non-decreasing",
            ));
        }
        Ok(Self {
            hist,
            edges,
            metadata: ViewMetadata::default(),
        })
    }

    pub fn with_labels(mut self, xlabel: impl Into<String>, ylabel: impl Into<String>) -> Self {
        self.metadata.xlabel = Some(xlabel.into());
        self.metadata.ylabel = Some(ylabel.into());
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

    pub fn hist(&self) -> &[f64] {
        &self.hist
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Number of bins.
    pub fn bins(&self) -> usize {
        self.hist.len()
    }

    /// Bar widths from consecutive edges.
    pub fn widths(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| w[1] - w[0]).collect()
    }

    pub fn lbrt(&self) -> Option<Bounds> {
        let (first, last) = (self.edges.first()?, self.edges.last()?);
        let top = self.hist.iter().copied().fold(0.0, f64::max);
        let bottom = self.hist.iter().copied().fold(0.0, f64::min);
        Some(Bounds::new(*first, bottom, *last, top))
    }
}
