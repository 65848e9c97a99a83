//! Style and plot-option registry.
//!
//! Two lookups drive every renderer:
//!
//! - **style** options (colours, line widths, colour maps...) keyed by a
//!   view's style group and a cyclic index, so sibling layers of one group
//!   get distinct looks;
//! - **plotting** overrides, per-group partial [`PlotSettings`] applied when
//!   a composite plot constructs its children.
//!
//! The registry is plain data and can be loaded from JSON:
//!
//! ```
//! use dataviews::options::StyleRegistry;
//!
//! let registry = StyleRegistry::from_json(r#"{
//!     "style": {
//!         "DataCurves": { "base": { "linewidth": 2 }, "cycle": [ { "color": "r" }, { "color": "b" } ] }
//!     },
//!     "plotting": { "DataCurves": { "num_ticks": 3 } }
//! }"#).unwrap();
//! assert_eq!(registry.style("DataCurves", 3)["color"], "b");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{DataViewError, DataViewResult};

/// Style options passed through to figure primitives.
pub type StyleOptions = BTreeMap<String, Value>;

/// Colour bar placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Every option understood by the renderers.
///
/// Composite plots pass their own settings down to children, merged with any
/// per-group overrides from the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    /// Figure size in inches.
    pub size: (f64, f64),
    pub show_axes: bool,
    pub show_grid: bool,
    pub show_title: bool,
    pub show_legend: bool,
    /// Raster colour bar, off when `None`.
    pub colorbar: Option<Orientation>,
    /// Centre the peak of cyclic curves.
    pub center: bool,
    pub num_ticks: usize,
    /// Label cyclic curves on a relative `[-90, 90]` scale instead of degrees.
    pub relative_labels: bool,
    /// Coordinate grid border as a fraction of the packed extent.
    pub border: f64,
    pub float_precision: usize,
    pub max_value_len: usize,
    pub max_font_size: f64,
    /// Table inset on each side, a fraction in `[0, 0.5]`.
    pub table_border: f64,
    /// Place coordinate grid cells in their full bounds rather than their ROI.
    pub situate: bool,
    /// Render the region of interest of each grid layout cell.
    pub roi: bool,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            size: (5.0, 5.0),
            show_axes: true,
            show_grid: false,
            show_title: true,
            show_legend: true,
            colorbar: None,
            center: true,
            num_ticks: 5,
            relative_labels: false,
            border: 0.1,
            float_precision: 3,
            max_value_len: 20,
            max_font_size: 20.0,
            table_border: 0.05,
            situate: false,
            roi: false,
        }
    }
}

impl PlotSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check value ranges.
    pub fn validate(&self) -> DataViewResult<()> {
        if self.size.0 <= 0.0 || self.size.1 <= 0.0 {
            return Err(DataViewError::invalid_parameter(
                "size",
                format!("figure size must be positive, got {:?}", self.size),
            ));
        }
        if !(0.0..=0.5).contains(&self.table_border) {
            return Err(DataViewError::invalid_parameter(
                "table_border",
                format!("must lie in [0, 0.5], got {}", self.table_border),
            ));
        }
        if self.border < 0.0 {
            return Err(DataViewError::invalid_parameter(
                "border",
                format!("must be non-negative, got {}", self.border),
            ));
        }
        if self.max_value_len < 4 {
            return Err(DataViewError::invalid_parameter(
                "max_value_len",
                "must leave room for at least one character and an ellipsis",
            ));
        }
        Ok(())
    }

    /// These settings with `overrides` applied on top.
    ///
    /// Unknown keys and mistyped values are configuration errors.
    pub fn merged(&self, overrides: &Map<String, Value>) -> DataViewResult<Self> {
        if overrides.is_empty() {
            return Ok(self.clone());
        }
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(fields) = &mut value {
            for (key, override_value) in overrides {
                if !fields.contains_key(key) {
                    return Err(DataViewError::invalid_parameter(
                        key.clone(),
                        "not a plot setting",
                    ));
                }
                fields.insert(key.clone(), override_value.clone());
            }
        }
        let merged: PlotSettings = serde_json::from_value(value)?;
        merged.validate()?;
        Ok(merged)
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_colorbar(mut self, orientation: Orientation) -> Self {
        self.colorbar = Some(orientation);
        self
    }

    pub fn hide_axes(mut self) -> Self {
        self.show_axes = false;
        self
    }

    pub fn hide_title(mut self) -> Self {
        self.show_title = false;
        self
    }

    pub fn hide_legend(mut self) -> Self {
        self.show_legend = false;
        self
    }
}

/// Base options plus a cycle of per-index variations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleGroup {
    pub base: StyleOptions,
    pub cycle: Vec<StyleOptions>,
}

impl StyleGroup {
    /// `base` merged with entry `cyclic_index mod len` of the cycle.
    pub fn resolve(&self, cyclic_index: usize) -> StyleOptions {
        let mut options = self.base.clone();
        if !self.cycle.is_empty() {
            let entry = &self.cycle[cyclic_index % self.cycle.len()];
            options.extend(entry.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        options
    }
}

/// Per-group style cycles and plot setting overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleRegistry {
    style: BTreeMap<String, StyleGroup>,
    plotting: BTreeMap<String, Map<String, Value>>,
}

impl StyleRegistry {
    /// An empty registry: every lookup yields no options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the standard look of each view kind.
    pub fn with_defaults() -> Self {
        let palette = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b"];
        let colour_cycle: Vec<StyleOptions> = palette
            .iter()
            .map(|c| StyleOptions::from([("color".to_string(), Value::from(*c))]))
            .collect();

        let mut registry = Self::new();
        registry.set_style(
            "SheetView",
            StyleOptions::from([
                ("cmap".to_string(), Value::from("gray")),
                ("interpolation".to_string(), Value::from("nearest")),
            ]),
            Vec::new(),
        );
        registry.set_style("DataCurves", StyleOptions::new(), colour_cycle.clone());
        registry.set_style("SheetLines", StyleOptions::new(), colour_cycle.clone());
        registry.set_style(
            "SheetPoints",
            StyleOptions::from([("s".to_string(), Value::from(10))]),
            colour_cycle.clone(),
        );
        registry.set_style("DataHistogram", StyleOptions::new(), colour_cycle);
        registry.set_style(
            "Annotation",
            StyleOptions::from([("color".to_string(), Value::from("k"))]),
            Vec::new(),
        );
        registry
    }

    /// Parse a registry from JSON with optional `style` and `plotting` maps.
    pub fn from_json(json: &str) -> DataViewResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn set_style(
        &mut self,
        group: impl Into<String>,
        base: StyleOptions,
        cycle: Vec<StyleOptions>,
    ) {
        self.style.insert(group.into(), StyleGroup { base, cycle });
    }

    pub fn set_plotting(&mut self, group: impl Into<String>, overrides: Map<String, Value>) {
        self.plotting.insert(group.into(), overrides);
    }

    /// Resolved style options for `group` at `cyclic_index`; empty for an
    /// unknown group.
    pub fn style(&self, group: &str, cyclic_index: usize) -> StyleOptions {
        self.style
            .get(group)
            .map(|g| g.resolve(cyclic_index))
            .unwrap_or_default()
    }

    pub fn style_group(&self, group: &str) -> Option<&StyleGroup> {
        self.style.get(group)
    }

    /// Plot setting overrides registered for `group`.
    pub fn plotting(&self, group: &str) -> Option<&Map<String, Value>> {
        self.plotting.get(group)
    }

    /// `settings` with the overrides for `group` applied.
    pub fn settings_for(&self, group: &str, settings: &PlotSettings) -> DataViewResult<PlotSettings> {
        match self.plotting(group) {
            Some(overrides) => settings.merged(overrides),
            None => Ok(settings.clone()),
        }
    }
}

/// Keep only the options named in `allowed`, logging what is dropped.
pub fn filter_style(options: &StyleOptions, allowed: &[&str], renderer: &str) -> StyleOptions {
    let mut kept = StyleOptions::new();
    for (key, value) in options {
        if allowed.contains(&key.as_str()) {
            kept.insert(key.clone(), value.clone());
        } else {
            tracing::debug!(renderer, option = %key, "dropping unsupported style option");
        }
    }
    kept
}

/// Read a string option.
pub fn style_str<'a>(options: &'a StyleOptions, key: &str) -> Option<&'a str> {
    options.get(key).and_then(Value::as_str)
}

/// Read a numeric option.
pub fn style_f64(options: &StyleOptions, key: &str) -> Option<f64> {
    options.get(key).and_then(Value::as_f64)
}
