// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)]
// Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::large_stack_arrays)] // Helps avoid stack overflows
#![warn(clippy::box_collection)] // Warns on boxed `Vec`, `String`, etc.
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::identity_op)] // e.g., `x + 0`, `x * 1`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::let_unit_value)] // Avoids binding `()` to variables
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![allow(clippy::too_many_arguments)]
// Allow functions with many parameters (very few and far between)

//! # DataViews
//!
//! Plot dispatch and frame-driven animation for stacked scientific data
//! views, plus a small library of composable number generators.
//!
//! ## Overview
//!
//! Data is wrapped in typed views (rasters, point sets, curves, histograms,
//! tables, annotations) and collected into keyed [`views::Stack`]s that
//! evolve along one or more dimensions, usually time. A renderer draws the
//! top of a stack once, then replays any other frame by mutating the
//! primitives it drew, which is what makes animation cheap.
//!
//! Renderers are resolved from the view kind through a
//! [`plotting::PlotRegistry`]; overlays and grids are composite renderers
//! that build their children through the same registry.
//!
//! ## Features
//!
//! - `html`: export a [`figure::Figure`] to an interactive plotly HTML
//!   document (adds the `plotly` dependency)
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`DataViewResult`]:
//!
//! ```rust
//! use dataviews::{DataViewError, DataViewResult};
//! use dataviews::plotting::{PlotContext, SheetViewPlot};
//! use dataviews::views::DataCurves;
//! use ndarray::array;
//!
//! # fn example() -> DataViewResult<()> {
//! let curves = DataCurves::new(vec![array![[0.0, 1.0], [1.0, 2.0]]])?;
//! match SheetViewPlot::new(curves, PlotContext::default()) {
//!     Err(DataViewError::TypeMismatch { expected, actual, .. }) => {
//!         eprintln!("wanted {expected}, got {actual}");
//!     }
//!     other => {
//!         other?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Quick Start
//!
//! ### Animating a stack of rasters
//!
//! ```rust
//! use dataviews::plotting::{self, Plot};
//! use dataviews::views::{Bounds, SheetView, Stack};
//! use ndarray::Array2;
//!
//! # fn example() -> dataviews::DataViewResult<()> {
//! let bounds = Bounds::new(-0.5, -0.5, 0.5, 0.5);
//! let stack = Stack::from_items(
//!     vec!["time"],
//!     (0..10).map(|t| (t as f64, SheetView::new(Array2::from_elem((4, 4), t as f64), bounds))),
//! )?;
//!
//! let mut plot = plotting::plot(stack)?;
//! let figure = plot.snapshot(3)?;
//! assert_eq!(figure.axes_count(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ### Overlaying annotations
//!
//! ```rust
//! use dataviews::plotting::{self, Plot};
//! use dataviews::views::{Annotation, Bounds, Overlay, SheetView};
//! use ndarray::Array2;
//!
//! # fn example() -> dataviews::DataViewResult<()> {
//! let sheet = SheetView::new(Array2::zeros((4, 4)), Bounds::new(0.0, 0.0, 1.0, 1.0));
//! let marks = Annotation::new().vline(0.5, None).hline(0.25, None);
//! let overlay = Overlay::new(vec![sheet.into(), marks.into()])?;
//!
//! let figure = plotting::plot(overlay)?.render()?;
//! assert_eq!(figure.primitive_count(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ### Number generators
//!
//! ```rust
//! use dataviews::numbergen::{BoundedNumber, NormalRandom, NumberGenerator, RandomConfig, Time};
//!
//! let time = Time::new();
//! let noise = NormalRandom::new(0.0, 1.0, RandomConfig::seeded(42), &time).expect("valid sigma");
//! let mut clipped = BoundedNumber::new(noise, Some(-2.0), Some(2.0)).expect("valid bounds");
//! assert!(clipped.next_value().abs() <= 2.0);
//! ```
//!
//! ## Core Type System
//!
//! - [`views::View`]: one immutable unit of data
//! - [`views::Stack`]: keyed frames of one view kind
//! - [`views::Plottable`]: anything a renderer can be built over
//! - [`figure::Figure`]: the retained-mode scene renderers draw into
//! - [`plotting::Plot`]: the render / render_frame / animate contract
//! - [`numbergen::NumberGenerator`]: scalar sources and their expressions

pub mod error;
pub mod figure;
pub mod numbergen;
pub mod options;
pub mod plotting;
pub mod views;

pub use error::{DataViewError, DataViewResult};
pub use options::{PlotSettings, StyleRegistry};
pub use plotting::{Plot, PlotContext, plot};
