//! Export of a figure to an interactive plotly HTML document.

use std::path::Path;

use plotly::common::{Mode, Title};
use plotly::layout::{Axis, Layout, TickMode};
use plotly::{Bar, HeatMap, Plot, Scatter};

use super::{Axes, AxesHandle, Figure, Primitive, SpanOrientation};
use crate::{DataViewError, DataViewResult};

/// plotly numbers at most this many axis pairs in one layout.
const MAX_SUBPLOTS: usize = 8;

/// Pixels per inch used to size the exported layout.
const PIXELS_PER_INCH: f64 = 100.0;

impl Figure {
    /// Convert the figure into a plotly plot.
    ///
    /// Visible axes become subplots positioned by their figure rect; hidden
    /// host axes without primitives are skipped.
    pub fn to_plotly(&self) -> DataViewResult<Plot> {
        let mut plot = Plot::new();
        let mut layout = Layout::new()
            .width((self.size.0 * PIXELS_PER_INCH) as usize)
            .height((self.size.1 * PIXELS_PER_INCH) as usize)
            .show_legend(false);

        let exported: Vec<AxesHandle> = self
            .axes_handles()
            .filter(|h| {
                self.axes(*h)
                    .map(|a| a.axis_visible || !a.primitive_ids().is_empty())
                    .unwrap_or(false)
            })
            .collect();
        if exported.len() > MAX_SUBPLOTS {
            return Err(DataViewError::invalid_parameter(
                "axes",
                format!("HTML export supports at most {MAX_SUBPLOTS} axes, got {}", exported.len()),
            ));
        }

        for (index, handle) in exported.iter().enumerate() {
            let axes = self.axes(*handle)?;
            let (x_ref, y_ref) = if index == 0 {
                ("x".to_string(), "y".to_string())
            } else {
                (format!("x{}", index + 1), format!("y{}", index + 1))
            };

            let mut primitives = self.primitives_on(*handle)?;
            primitives.sort_by_key(|(id, _)| self.placement(*id).map(|(_, z)| z).unwrap_or(0));
            for (_, primitive) in primitives {
                add_primitive(&mut plot, axes, primitive, &x_ref, &y_ref);
            }

            if axes.legend.is_some() {
                layout = layout.show_legend(true);
            }
            let (x_axis, y_axis) = plotly_axes(axes);
            layout = match index + 1 {
                1 => layout.x_axis(x_axis).y_axis(y_axis),
                2 => layout.x_axis2(x_axis).y_axis2(y_axis),
                3 => layout.x_axis3(x_axis).y_axis3(y_axis),
                4 => layout.x_axis4(x_axis).y_axis4(y_axis),
                5 => layout.x_axis5(x_axis).y_axis5(y_axis),
                6 => layout.x_axis6(x_axis).y_axis6(y_axis),
                7 => layout.x_axis7(x_axis).y_axis7(y_axis),
                _ => layout.x_axis8(x_axis).y_axis8(y_axis),
            };
            if let (0, Some(title)) = (index, axes.title.as_deref()) {
                layout = layout.title(Title::with_text(title));
            }
        }

        plot.set_layout(layout);
        Ok(plot)
    }

    /// Render the figure as a standalone HTML document.
    pub fn to_html(&self) -> DataViewResult<String> {
        Ok(self.to_plotly()?.to_html())
    }

    /// Write the figure as HTML to `path`.
    pub fn write_html<P: AsRef<Path>>(&self, path: P) -> DataViewResult<()> {
        let html = self.to_html()?;
        std::fs::write(path, html)?;
        Ok(())
    }
}

fn plotly_axes(axes: &Axes) -> (Axis, Axis) {
    let [left, bottom, width, height] = axes.rect;
    let mut x_axis = Axis::new()
        .domain(&[left, left + width])
        .visible(axes.axis_visible)
        .show_grid(axes.grid);
    let mut y_axis = Axis::new()
        .domain(&[bottom, bottom + height])
        .visible(axes.axis_visible)
        .show_grid(axes.grid);

    if let Some((lo, hi)) = axes.xlim {
        x_axis = x_axis.range(vec![lo, hi]);
    }
    if let Some((lo, hi)) = axes.ylim {
        y_axis = y_axis.range(vec![lo, hi]);
    }
    if let Some(label) = axes.xlabel.as_deref() {
        x_axis = x_axis.title(Title::with_text(label));
    }
    if let Some(label) = axes.ylabel.as_deref() {
        y_axis = y_axis.title(Title::with_text(label));
    }
    if let (Some(ticks), Some(labels)) = (&axes.xticks, &axes.xtick_labels) {
        x_axis = x_axis
            .tick_mode(TickMode::Array)
            .tick_values(ticks.clone())
            .tick_text(labels.clone());
    }
    (x_axis, y_axis)
}

fn add_primitive(plot: &mut Plot, axes: &Axes, primitive: &Primitive, x_ref: &str, y_ref: &str) {
    match primitive {
        Primitive::Lines { paths, label, .. } => {
            for path in paths {
                let (x, y): (Vec<f64>, Vec<f64>) = path.iter().map(|p| (p[0], p[1])).unzip();
                let mut trace = Scatter::new(x, y).mode(Mode::Lines).x_axis(x_ref).y_axis(y_ref);
                if let Some(name) = label.as_deref() {
                    trace = trace.name(name);
                }
                plot.add_trace(trace);
            }
        }
        Primitive::Scatter { offsets, .. } => {
            let (x, y): (Vec<f64>, Vec<f64>) = offsets.iter().map(|p| (p[0], p[1])).unzip();
            plot.add_trace(Scatter::new(x, y).mode(Mode::Markers).x_axis(x_ref).y_axis(y_ref));
        }
        Primitive::Image {
            data, extent, clim, ..
        } => {
            let (rows, cols, depth) = data.dim();
            if rows == 0 || cols == 0 {
                return;
            }
            let (lo, hi) = *clim;
            // Rows run top to bottom; plotly heatmaps run bottom to top.
            let z: Vec<Vec<f64>> = (0..rows)
                .rev()
                .map(|r| {
                    (0..cols)
                        .map(|c| {
                            let mean = (0..depth).map(|d| data[[r, c, d]]).sum::<f64>() / depth as f64;
                            mean.clamp(lo.min(hi), hi.max(lo))
                        })
                        .collect()
                })
                .collect();
            let dx = extent.width() / cols as f64;
            let dy = extent.height() / rows as f64;
            let x: Vec<f64> = (0..cols).map(|c| extent.left + (c as f64 + 0.5) * dx).collect();
            let y: Vec<f64> = (0..rows).map(|r| extent.bottom + (r as f64 + 0.5) * dy).collect();
            plot.add_trace(HeatMap::new_z(z).x(x).y(y).x_axis(x_ref).y_axis(y_ref));
        }
        Primitive::Bars {
            lefts,
            widths,
            heights,
            ..
        } => {
            let centres: Vec<f64> = lefts.iter().zip(widths).map(|(l, w)| l + w / 2.0).collect();
            plot.add_trace(Bar::new(centres, heights.clone()).x_axis(x_ref).y_axis(y_ref));
        }
        Primitive::Span {
            orientation, value, ..
        } => {
            let (x, y) = match orientation {
                SpanOrientation::Vertical => {
                    let (lo, hi) = axes.ylim.unwrap_or((0.0, 1.0));
                    (vec![*value, *value], vec![lo, hi])
                }
                SpanOrientation::Horizontal => {
                    let (lo, hi) = axes.xlim.unwrap_or((0.0, 1.0));
                    (vec![lo, hi], vec![*value, *value])
                }
            };
            plot.add_trace(Scatter::new(x, y).mode(Mode::Lines).x_axis(x_ref).y_axis(y_ref));
        }
        Primitive::Text { text, xy, .. } => {
            plot.add_trace(
                Scatter::new(vec![xy.0], vec![xy.1])
                    .mode(Mode::Text)
                    .text(text)
                    .x_axis(x_ref)
                    .y_axis(y_ref),
            );
        }
        Primitive::Table { cells, bbox, .. } => {
            let rows = cells.len();
            for (r, row) in cells.iter().enumerate() {
                let cols = row.len();
                for (c, cell) in row.iter().enumerate() {
                    let x = bbox.left + (c as f64 + 0.5) * bbox.width() / cols as f64;
                    let y = bbox.top - (r as f64 + 0.5) * bbox.height() / rows as f64;
                    plot.add_trace(
                        Scatter::new(vec![x], vec![y])
                            .mode(Mode::Text)
                            .text(&cell.text)
                            .x_axis(x_ref)
                            .y_axis(y_ref),
                    );
                }
            }
        }
        // Colour scales are implied by the heatmap trace.
        Primitive::Colorbar { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::StyleOptions;
    use crate::views::Bounds;
    use ndarray::Array3;

    #[test]
    fn test_export_contains_traces() {
        let mut figure = Figure::new((4.0, 3.0));
        let axes = figure.add_full_axes();
        figure.axes_mut(axes).expect("axes").title = Some("Field".to_string());
        figure
            .add_image(
                axes,
                Array3::zeros((2, 2, 1)),
                Bounds::new(0.0, 0.0, 1.0, 1.0),
                (0.0, 1.0),
                StyleOptions::new(),
                0,
            )
            .expect("image");
        let html = figure.to_html().expect("export");
        assert!(html.contains("heatmap"));
        assert!(html.contains("Field"));
    }

    #[test]
    fn test_too_many_axes() {
        let mut figure = Figure::new((4.0, 3.0));
        for _ in 0..9 {
            figure.add_full_axes();
        }
        assert!(figure.to_plotly().is_err());
    }
}
