//! Tabular views.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ViewMetadata;
use crate::{DataViewError, DataViewResult};

/// Value held by one table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(v) => write!(f, "{v}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// Role of a cell, used to pick its font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    Heading,
    Data,
}

/// A rectangular grid of cell values with optional heading row and column.
#[derive(Debug, Clone)]
pub struct TableView {
    cells: Vec<Vec<CellValue>>,
    heading_row: bool,
    heading_col: bool,
    pub metadata: ViewMetadata,
}

impl TableView {
    /// Build a table from rows of equal length.
    pub fn from_rows(cells: Vec<Vec<CellValue>>) -> DataViewResult<Self> {
        let cols = cells.first().map_or(0, Vec::len);
        if cells.is_empty() || cols == 0 {
            return Err(DataViewError::invalid_parameter(
                "cells",
                "a table needs at least one row and one column",
            ));
        }
        if let Some((row, len)) = cells
            .iter()
            .enumerate()
            .map(|(i, row)| (i, row.len()))
            .find(|(_, len)| *len != cols)
        {
            return Err(DataViewError::invalid_parameter(
                "cells",
                format!("row {row} has {len} cells, expected {cols}"),
            ));
        }
        Ok(Self {
            cells,
            heading_row: false,
            heading_col: false,
            metadata: ViewMetadata::default(),
        })
    }

    /// A two-column key/value table whose first column is a heading.
    pub fn from_mapping<K, V, I>(items: I) -> DataViewResult<Self>
    where
        K: Into<String>,
        V: Into<CellValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let rows = items
            .into_iter()
            .map(|(k, v)| vec![CellValue::Text(k.into()), v.into()])
            .collect();
        Ok(Self::from_rows(rows)?.with_heading_col(true))
    }

    pub fn with_heading_row(mut self, heading: bool) -> Self {
        self.heading_row = heading;
        self
    }

    pub fn with_heading_col(mut self, heading: bool) -> Self {
        self.heading_col = heading;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn cell_value(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    pub fn cell_type(&self, row: usize, col: usize) -> CellType {
        if (self.heading_row && row == 0) || (self.heading_col && col == 0) {
            CellType::Heading
        } else {
            CellType::Data
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_table() {
        let table = TableView::from_mapping(vec![("mean", 0.5), ("max", 2.0)]).expect("valid");
        assert_eq!((table.rows(), table.cols()), (2, 2));
        assert_eq!(table.cell_type(1, 0), CellType::Heading);
        assert_eq!(table.cell_type(1, 1), CellType::Data);
        assert_eq!(table.cell_value(1, 1), Some(&CellValue::Float(2.0)));
        assert_eq!(table.cell_value(2, 0), None);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![CellValue::from(1i64)], vec![1i64.into(), 2i64.into()]];
        assert!(TableView::from_rows(rows).is_err());
        assert!(TableView::from_rows(vec![]).is_err());
    }
}
