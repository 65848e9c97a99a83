//! Graphic primitives held by a [`Figure`](super::Figure) and the typed
//! handles that address them.

use std::fmt;

use ndarray::Array3;

use crate::options::{Orientation, StyleOptions};
use crate::views::Bounds;

/// Slot index of a primitive in its figure, tagged with the generation of
/// the slot so that ids of removed primitives never address a reused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Handle to an axes of a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AxesHandle(pub(crate) usize);

macro_rules! typed_handle {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name(pub(crate) PrimitiveId);

            impl $name {
                /// The untyped primitive id.
                pub const fn id(&self) -> PrimitiveId {
                    self.0
                }
            }

            impl From<$name> for PrimitiveId {
                fn from(handle: $name) -> Self {
                    handle.0
                }
            }
        )*
    };
}

typed_handle!(
    /// A set of polylines.
    LinesHandle,
    /// A scatter collection.
    ScatterHandle,
    /// An image.
    ImageHandle,
    /// A bar set.
    BarsHandle,
    /// A text label, optionally with an arrow.
    TextHandle,
    /// A table of text cells.
    TableHandle,
    /// A colour scale bar attached to an image.
    ColorbarHandle,
    /// A full-width or full-height reference line.
    SpanHandle,
);

/// Direction of a reference line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanOrientation {
    Vertical,
    Horizontal,
}

/// One text cell of a table primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub text: String,
    pub bold: bool,
    pub monospace: bool,
}

/// Everything a figure can draw.
#[derive(Debug, Clone)]
pub enum Primitive {
    Lines {
        paths: Vec<Vec<[f64; 2]>>,
        label: Option<String>,
        style: StyleOptions,
    },
    Scatter {
        offsets: Vec<[f64; 2]>,
        style: StyleOptions,
    },
    Image {
        data: Array3<f64>,
        extent: Bounds,
        clim: (f64, f64),
        style: StyleOptions,
    },
    Bars {
        lefts: Vec<f64>,
        widths: Vec<f64>,
        heights: Vec<f64>,
        style: StyleOptions,
    },
    Span {
        orientation: SpanOrientation,
        value: f64,
        style: StyleOptions,
    },
    Text {
        text: String,
        xy: (f64, f64),
        /// Offset of the text from `xy`, in points.
        offset: (f64, f64),
        arrowstyle: Option<String>,
        style: StyleOptions,
    },
    Table {
        cells: Vec<Vec<TableCell>>,
        /// Placement within the axes, in axes fractions.
        bbox: Bounds,
        font_size: f64,
    },
    Colorbar {
        image: ImageHandle,
        orientation: Orientation,
        clim: (f64, f64),
        visible: bool,
    },
}

impl Primitive {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Primitive::Lines { .. } => "lines",
            Primitive::Scatter { .. } => "scatter",
            Primitive::Image { .. } => "image",
            Primitive::Bars { .. } => "bars",
            Primitive::Span { .. } => "span",
            Primitive::Text { .. } => "text",
            Primitive::Table { .. } => "table",
            Primitive::Colorbar { .. } => "colorbar",
        }
    }

    /// Legend label, for primitives that carry one.
    pub fn label(&self) -> Option<&str> {
        match self {
            Primitive::Lines { label, .. } => label.as_deref(),
            _ => None,
        }
    }

    pub fn style(&self) -> Option<&StyleOptions> {
        match self {
            Primitive::Lines { style, .. }
            | Primitive::Scatter { style, .. }
            | Primitive::Image { style, .. }
            | Primitive::Bars { style, .. }
            | Primitive::Span { style, .. }
            | Primitive::Text { style, .. } => Some(style),
            Primitive::Table { .. } | Primitive::Colorbar { .. } => None,
        }
    }
}
