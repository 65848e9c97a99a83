//! Layered renderer: one child plot per overlay layer on a shared axes.

use std::collections::HashMap;

use super::{AxisDecor, DrawArgs, Plot, PlotContext, PlotResult, clamp_frame, prepare_axes};
use crate::DataViewError;
use crate::figure::{AxesHandle, Figure};
use crate::options::PlotSettings;
use crate::views::{Plottable, Stack, ViewKind};

struct Layer {
    plot: Box<dyn Plot>,
    cyclic_index: usize,
    kind: ViewKind,
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("plot", &self.plot.name())
            .field("cyclic_index", &self.cyclic_index)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Draws a stack of overlays by splitting it into one stack per layer and
/// rendering each through the registry onto the same axes.
///
/// Layers sharing a style group take successive entries of that group's
/// style cycle, counted across the whole overlay. Layer `i` is drawn at
/// z-order `i`, so only the bottom layer sets the title.
#[derive(Debug)]
pub struct OverlayPlot {
    stack: Stack,
    context: PlotContext,
    layers: Vec<Layer>,
    axes: Option<AxesHandle>,
}

impl OverlayPlot {
    pub const NAME: &'static str = "OverlayPlot";

    pub fn new(source: impl Into<Plottable>, context: PlotContext) -> PlotResult<Self> {
        let stack = source.into().into_stack(Self::NAME)?;
        if !matches!(stack.kind(), ViewKind::SheetOverlay | ViewKind::DataOverlay) {
            return Err(DataViewError::TypeMismatch {
                renderer: Self::NAME,
                expected: ViewKind::DataOverlay,
                actual: stack.kind(),
            });
        }

        let mut counters: HashMap<String, usize> = HashMap::new();
        let mut layers = Vec::new();
        for (zorder, layer) in stack.split()?.into_iter().enumerate() {
            let group = layer.style_group().to_string();
            let counter = counters.entry(group.clone()).or_insert(0);
            let cyclic_index = *counter;
            *counter += 1;

            let settings = context.options.settings_for(&group, &context.settings)?;
            let child = context.child(settings, zorder as i32);
            let kind = layer.kind();
            let plot = context.registry.build(Plottable::Stack(layer), child)?;
            tracing::debug!(layer = zorder, renderer = plot.name(), cyclic_index, "built overlay layer");
            layers.push(Layer {
                plot,
                cyclic_index,
                kind,
            });
        }

        Ok(Self {
            stack,
            context,
            layers,
            axes: None,
        })
    }

    pub(crate) fn boxed(source: Plottable, context: PlotContext) -> PlotResult<Box<dyn Plot>> {
        Ok(Box::new(Self::new(source, context)?))
    }

    /// Names of the child renderers, bottom layer first.
    pub fn layer_renderers(&self) -> Vec<&'static str> {
        self.layers.iter().map(|l| l.plot.name()).collect()
    }

    /// Style cycle position of each layer, bottom layer first.
    pub fn cyclic_indices(&self) -> Vec<usize> {
        self.layers.iter().map(|l| l.cyclic_index).collect()
    }
}

impl Plot for OverlayPlot {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn settings(&self) -> &PlotSettings {
        &self.context.settings
    }

    fn frame_count(&self) -> usize {
        self.stack.len()
    }

    fn render_into(
        &mut self,
        figure: &mut Figure,
        axes: Option<AxesHandle>,
        args: DrawArgs,
    ) -> PlotResult<AxesHandle> {
        let lbrt = args.lbrt.or_else(|| self.stack.bounds());
        let (xlabel, ylabel) = if self.stack.kind() == ViewKind::SheetOverlay {
            (Some("x"), Some("y"))
        } else {
            self.stack.labels()
        };
        let axes = prepare_axes(
            figure,
            axes,
            &self.context.settings,
            AxisDecor {
                owns_title: false,
                xlabel,
                ylabel,
                lbrt,
                ..AxisDecor::default()
            },
        )?;

        for layer in &mut self.layers {
            let layer_lbrt = if layer.kind == ViewKind::Annotation {
                None
            } else {
                lbrt
            };
            layer
                .plot
                .render_into(figure, Some(axes), DrawArgs::new(layer.cyclic_index, layer_lbrt))?;
        }
        self.axes = Some(axes);
        Ok(axes)
    }

    fn render_frame(&mut self, figure: &mut Figure, n: usize) -> PlotResult<()> {
        if self.axes.is_none() {
            return Err(DataViewError::NotRendered(Self::NAME));
        }
        let n = clamp_frame(n, self.stack.len());
        for layer in &mut self.layers {
            layer.plot.render_frame(figure, n)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::Primitive;
    use crate::views::annotation::interval;
    use crate::views::{Annotation, Bounds, DataCurves, Overlay, SheetView};
    use ndarray::{Array2, array};

    #[test]
    fn test_style_cycles_across_layers() {
        let curve = || DataCurves::new(vec![array![[0.0, 0.0], [1.0, 1.0]]]).expect("valid");
        let overlay = Overlay::new((0..4).map(|_| curve().into()).collect()).expect("valid");
        let plot = OverlayPlot::new(overlay, PlotContext::default()).expect("overlay");
        assert_eq!(plot.cyclic_indices(), vec![0, 1, 2, 3]);
        assert_eq!(plot.layer_renderers(), vec!["DataCurvePlot"; 4]);
    }

    #[test]
    fn test_raster_with_annotation() {
        let unit = Bounds::new(0.0, 0.0, 1.0, 1.0);
        let frame = |t: f64| {
            let sheet = SheetView::new(Array2::from_elem((2, 2), t), unit).with_title(format!("t={t}"));
            let marks = Annotation::new().vline(0.5, Some(interval("time", Some(0.0), None)));
            Overlay::new(vec![sheet.into(), marks.into()]).expect("valid")
        };
        let stack = Stack::from_items(vec!["time"], vec![(0.0, frame(0.0)), (1.0, frame(1.0))])
            .expect("valid");
        assert_eq!(stack.kind(), ViewKind::SheetOverlay);

        let mut plot = OverlayPlot::new(stack, PlotContext::default()).expect("overlay");
        assert_eq!(plot.layer_renderers(), vec!["SheetViewPlot", "AnnotationPlot"]);
        let mut figure = plot.render().expect("render");
        assert_eq!(figure.axes_count(), 1);
        let axes = figure.axes_handles().next().expect("axes");
        assert_eq!(figure.primitives_on(axes).expect("axes").len(), 2);
        assert_eq!(figure.axes(axes).expect("axes").title.as_deref(), Some("t=1"));

        plot.render_frame(&mut figure, 0).expect("frame");
        let kinds: Vec<&str> = figure
            .primitives_on(axes)
            .expect("axes")
            .into_iter()
            .map(|(_, p)| p.kind_name())
            .collect();
        assert_eq!(kinds.len(), 1);
        assert!(matches!(
            figure.primitives_on(axes).expect("axes")[0].1,
            Primitive::Image { .. }
        ));
        assert_eq!(figure.axes(axes).expect("axes").title.as_deref(), Some("t=0"));
    }

    #[test]
    fn test_rejects_non_overlay() {
        let curves = DataCurves::new(vec![array![[0.0, 0.0]]]).expect("valid");
        assert!(matches!(
            OverlayPlot::new(curves, PlotContext::default()),
            Err(DataViewError::TypeMismatch { .. })
        ));
    }
}
