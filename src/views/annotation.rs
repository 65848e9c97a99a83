//! Annotation views: reference lines, polylines and labelled arrows.

use std::collections::BTreeMap;

use super::ViewMetadata;

/// Per-dimension `(start, end)` bounds controlling when a spec is shown.
///
/// A spec is active for a key when, for every listed dimension, the key's
/// value is strictly greater than `start` and not greater than `end`.
pub type Interval = BTreeMap<String, (Option<f64>, Option<f64>)>;

/// Direction an arrow points in, relative to its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    /// `<`
    Left,
    /// `>`
    Right,
    /// `^`
    Up,
    /// `v`
    Down,
}

impl ArrowDirection {
    pub const fn symbol(&self) -> &'static str {
        match self {
            ArrowDirection::Left => "<",
            ArrowDirection::Right => ">",
            ArrowDirection::Up => "^",
            ArrowDirection::Down => "v",
        }
    }

    /// Text offset in points from the arrow tip.
    pub fn text_offset(&self, points: f64) -> (f64, f64) {
        match self {
            ArrowDirection::Down => (0.0, points),
            ArrowDirection::Up => (0.0, -points),
            ArrowDirection::Left => (points, 0.0),
            ArrowDirection::Right => (-points, 0.0),
        }
    }
}

/// What a single draw spec draws.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    VLine(f64),
    HLine(f64),
    Line(Vec<[f64; 2]>),
    Arrow {
        text: String,
        xy: (f64, f64),
        points: f64,
        direction: ArrowDirection,
        arrowstyle: String,
    },
}

impl Shape {
    /// Mode name used to select which style options apply.
    pub const fn mode(&self) -> &'static str {
        match self {
            Shape::VLine(_) => "vline",
            Shape::HLine(_) => "hline",
            Shape::Line(_) => "line",
            Shape::Arrow { direction, .. } => direction.symbol(),
        }
    }

    pub const fn is_line_like(&self) -> bool {
        !matches!(self, Shape::Arrow { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawSpec {
    pub shape: Shape,
    pub interval: Option<Interval>,
}

/// An ordered list of draw specs, only meaningful as an overlay layer.
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    specs: Vec<DrawSpec>,
    pub metadata: ViewMetadata,
}

impl Annotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spec(mut self, shape: Shape, interval: Option<Interval>) -> Self {
        self.specs.push(DrawSpec { shape, interval });
        self
    }

    pub fn vline(self, x: f64, interval: Option<Interval>) -> Self {
        self.with_spec(Shape::VLine(x), interval)
    }

    pub fn hline(self, y: f64, interval: Option<Interval>) -> Self {
        self.with_spec(Shape::HLine(y), interval)
    }

    pub fn line(self, points: Vec<[f64; 2]>, interval: Option<Interval>) -> Self {
        self.with_spec(Shape::Line(points), interval)
    }

    pub fn arrow(
        self,
        xy: (f64, f64),
        text: impl Into<String>,
        direction: ArrowDirection,
        points: f64,
        interval: Option<Interval>,
    ) -> Self {
        self.with_spec(
            Shape::Arrow {
                text: text.into(),
                xy,
                points,
                direction,
                arrowstyle: "->".to_string(),
            },
            interval,
        )
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.metadata.style = Some(style.into());
        self
    }

    pub fn specs(&self) -> &[DrawSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Shorthand for a single-dimension interval.
pub fn interval(dimension: impl Into<String>, start: Option<f64>, end: Option<f64>) -> Interval {
    let mut map = Interval::new();
    map.insert(dimension.into(), (start, end));
    map
}
