//! Annotation overlay renderer.

use super::{DrawArgs, Plot, PlotContext, PlotResult, check_stack, clamp_frame};
use crate::DataViewError;
use crate::figure::{AxesHandle, Figure, PrimitiveId, SpanOrientation};
use crate::options::{PlotSettings, StyleOptions, style_str};
use crate::views::{Annotation, DrawSpec, Interval, Key, Plottable, Shape, Stack, View, ViewKind};

const ANNOTATION_OPTIONS: &[&str] = &[
    "alpha", "color", "linewidth", "linestyle", "rotation", "family", "weight", "fontsize", "visible",
];
const LINE_OPTIONS: &[&str] = &["linewidth", "linestyle", "color"];
/// Options only meaningful for line-like specs; arrows never receive them.
const LINE_ONLY_OPTIONS: &[&str] = &["linewidth", "linestyle"];

/// Whether a spec with `interval` is shown at `key`.
///
/// A dimension missing from `labels` places no bound on that side: its start
/// compares as negative infinity and its end as positive infinity. Stacks
/// with only the default dimension show every spec.
pub(crate) fn is_active(labels: &[String], default_dimension: bool, key: &Key, interval: Option<&Interval>) -> bool {
    let Some(interval) = interval else {
        return true;
    };
    if default_dimension {
        return true;
    }
    interval.iter().all(|(dimension, (start, end))| {
        let Some(index) = labels.iter().position(|l| l == dimension) else {
            return true;
        };
        let value = key.values()[index];
        let start = start.unwrap_or(f64::NEG_INFINITY);
        let end = end.unwrap_or(f64::INFINITY);
        value > start && value <= end
    })
}

fn select(style: &StyleOptions, keep: impl Fn(&str) -> bool) -> StyleOptions {
    style
        .iter()
        .filter(|(k, _)| keep(k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn split_style(spec: &DrawSpec, style: &StyleOptions) -> (StyleOptions, Option<String>) {
    if spec.shape.is_line_like() {
        (select(style, |k| LINE_OPTIONS.contains(&k)), None)
    } else {
        let arrow_color = style_str(style, "color").unwrap_or("k").to_string();
        (select(style, |k| !LINE_ONLY_OPTIONS.contains(&k)), Some(arrow_color))
    }
}

#[derive(Debug, Clone)]
struct AnnotationState {
    axes: AxesHandle,
    handles: Vec<PrimitiveId>,
    style: StyleOptions,
}

/// Draws annotation specs over an existing axes, toggling each spec by its
/// interval as frames advance.
///
/// Annotations never own an axes: rendering without one fails.
#[derive(Debug)]
pub struct AnnotationPlot {
    stack: Stack,
    context: PlotContext,
    state: Option<AnnotationState>,
}

impl AnnotationPlot {
    pub const NAME: &'static str = "AnnotationPlot";

    pub fn new(source: impl Into<Plottable>, context: PlotContext) -> PlotResult<Self> {
        let stack = check_stack(source.into(), Self::NAME, ViewKind::Annotation)?;
        warn_unknown_dimensions(&stack);
        Ok(Self {
            stack,
            context,
            state: None,
        })
    }

    pub(crate) fn boxed(source: Plottable, context: PlotContext) -> PlotResult<Box<dyn Plot>> {
        Ok(Box::new(Self::new(source, context)?))
    }

    /// Primitives drawn for the current frame.
    pub fn handles(&self) -> &[PrimitiveId] {
        self.state.as_ref().map_or(&[], |s| &s.handles)
    }

    fn annotation_at(&self, n: usize) -> PlotResult<(&Key, &Annotation)> {
        match self.stack.frame(n) {
            Some((key, View::Annotation(annotation))) => Ok((key, annotation)),
            _ => Err(DataViewError::structure("annotation stack holds a non-annotation view")),
        }
    }

    fn draw(&self, figure: &mut Figure, axes: AxesHandle, n: usize, style: &StyleOptions) -> PlotResult<Vec<PrimitiveId>> {
        let (key, annotation) = self.annotation_at(n)?;
        let labels = self.stack.dimension_labels();
        let default_dimension = self.stack.has_default_dimension();
        let zorder = self.context.zorder;

        let mut handles = Vec::new();
        for spec in annotation.specs() {
            if !is_active(labels, default_dimension, key, spec.interval.as_ref()) {
                continue;
            }
            let (options, arrow_color) = split_style(spec, style);
            let id = match &spec.shape {
                Shape::VLine(x) => figure
                    .add_span(axes, SpanOrientation::Vertical, *x, options, zorder)?
                    .id(),
                Shape::HLine(y) => figure
                    .add_span(axes, SpanOrientation::Horizontal, *y, options, zorder)?
                    .id(),
                Shape::Line(points) => figure
                    .add_lines(axes, vec![points.clone()], None, options, zorder)?
                    .id(),
                Shape::Arrow {
                    text,
                    xy,
                    points,
                    direction,
                    arrowstyle,
                } => {
                    let mut options = options;
                    if let Some(color) = arrow_color {
                        options.insert("arrowcolor".to_string(), color.into());
                    }
                    figure
                        .add_text(
                            axes,
                            text.clone(),
                            *xy,
                            direction.text_offset(*points),
                            Some(arrowstyle.clone()),
                            options,
                            zorder,
                        )?
                        .id()
                }
            };
            handles.push(id);
        }
        Ok(handles)
    }
}

fn warn_unknown_dimensions(stack: &Stack) {
    if stack.has_default_dimension() {
        return;
    }
    let labels = stack.dimension_labels();
    let mut unknown: Vec<&str> = stack
        .values()
        .filter_map(|view| match view {
            View::Annotation(annotation) => Some(annotation),
            _ => None,
        })
        .flat_map(|annotation| annotation.specs())
        .filter_map(|spec| spec.interval.as_ref())
        .flat_map(|interval| interval.keys())
        .filter(|dimension| !labels.contains(dimension))
        .map(String::as_str)
        .collect();
    unknown.sort_unstable();
    unknown.dedup();
    if !unknown.is_empty() {
        tracing::warn!(
            dimensions = ?unknown,
            available = ?labels,
            "annotation intervals name dimensions the stack does not have"
        );
    }
}

impl Plot for AnnotationPlot {
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
        let axes = axes.ok_or(DataViewError::RequiresAxis(Self::NAME))?;
        let group = self.stack.style_group().to_string();
        let style = self
            .context
            .style(&group, args.cyclic_index, ANNOTATION_OPTIONS, Self::NAME);
        let handles = self.draw(figure, axes, self.stack.len() - 1, &style)?;
        self.state = Some(AnnotationState {
            axes,
            handles,
            style,
        });
        Ok(axes)
    }

    fn render_frame(&mut self, figure: &mut Figure, n: usize) -> PlotResult<()> {
        let state = self.state.as_mut().ok_or(DataViewError::NotRendered(Self::NAME))?;
        // Handles that could not be removed stay tracked for the next call.
        let mut pending = std::mem::take(&mut state.handles).into_iter();
        while let Some(id) = pending.next() {
            if let Err(err) = figure.remove(id) {
                state.handles = std::iter::once(id).chain(pending).collect();
                return Err(err);
            }
        }

        let n = clamp_frame(n, self.stack.len());
        let state = self.state.as_ref().ok_or(DataViewError::NotRendered(Self::NAME))?;
        let handles = self.draw(figure, state.axes, n, &state.style)?;
        if let Some(state) = self.state.as_mut() {
            state.handles = handles;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::Primitive;
    use crate::options::StyleRegistry;
    use crate::views::ArrowDirection;
    use crate::views::annotation::interval;
    use serde_json::Value;

    fn stack() -> Stack {
        let annotation = Annotation::new()
            .vline(0.5, Some(interval("time", Some(5.0), Some(10.0))))
            .hline(0.25, None);
        Stack::from_items(
            vec!["time"],
            [5.0, 7.0, 10.0, 12.0].map(|t| (t, annotation.clone())),
        )
        .expect("valid stack")
    }

    fn spans(figure: &Figure, plot: &AnnotationPlot) -> usize {
        plot.handles()
            .iter()
            .filter(|id| {
                matches!(
                    figure.primitive(**id),
                    Ok(crate::figure::Primitive::Span {
                        orientation: SpanOrientation::Vertical,
                        ..
                    })
                )
            })
            .count()
    }

    #[test]
    fn test_requires_axis() {
        let mut plot = AnnotationPlot::new(stack(), PlotContext::default()).expect("annotation");
        let err = plot.render().expect_err("no axes");
        assert!(matches!(err, DataViewError::RequiresAxis(_)));
    }

    #[test]
    fn test_interval_gates_specs() {
        let mut figure = Figure::new((5.0, 5.0));
        let axes = figure.add_full_axes();
        let mut plot = AnnotationPlot::new(stack(), PlotContext::default()).expect("annotation");
        plot.render_into(&mut figure, Some(axes), DrawArgs::default())
            .expect("render");
        // top key 12 is past the interval end
        assert_eq!(plot.handles().len(), 1);
        assert_eq!(spans(&figure, &plot), 0);

        plot.render_frame(&mut figure, 1).expect("time 7");
        assert_eq!(spans(&figure, &plot), 1);
        plot.render_frame(&mut figure, 0).expect("time 5");
        assert_eq!(spans(&figure, &plot), 0);
        plot.render_frame(&mut figure, 2).expect("time 10");
        assert_eq!(spans(&figure, &plot), 1);
        assert_eq!(figure.primitive_count(), 2);
    }

    #[test]
    fn test_arrows_drop_line_only_options() {
        let mut options = StyleRegistry::new();
        options.set_style(
            "Annotation",
            StyleOptions::from([
                ("linewidth".to_string(), Value::from(3)),
                ("linestyle".to_string(), Value::from("--")),
                ("fontsize".to_string(), Value::from(9)),
            ]),
            Vec::new(),
        );
        let annotation = Annotation::new()
            .arrow((0.5, 0.5), "peak", ArrowDirection::Left, 10.0, None)
            .vline(0.2, None);
        let stack = Stack::from_items(vec!["time"], vec![(0.0, annotation)]).expect("valid stack");
        let context = PlotContext::new(PlotSettings::default(), options);

        let mut figure = Figure::new((5.0, 5.0));
        let axes = figure.add_full_axes();
        let mut plot = AnnotationPlot::new(stack, context).expect("annotation");
        plot.render_into(&mut figure, Some(axes), DrawArgs::default())
            .expect("render");

        let mut seen = 0;
        for id in plot.handles() {
            match figure.primitive(*id).expect("live") {
                Primitive::Text { style, .. } => {
                    let keys: Vec<&str> = style.keys().map(String::as_str).collect();
                    assert_eq!(keys, vec!["arrowcolor", "fontsize"]);
                    seen += 1;
                }
                Primitive::Span { style, .. } => {
                    assert!(style.contains_key("linewidth"));
                    assert!(!style.contains_key("fontsize"));
                    seen += 1;
                }
                other => panic!("unexpected primitive {other:?}"),
            }
        }
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_failed_removal_keeps_state() {
        let mut figure = Figure::new((5.0, 5.0));
        let axes = figure.add_full_axes();
        let mut plot = AnnotationPlot::new(stack(), PlotContext::default()).expect("annotation");
        plot.render_into(&mut figure, Some(axes), DrawArgs::default())
            .expect("render");

        // Handles from one figure are not live in another.
        let mut other = Figure::new((5.0, 5.0));
        other.add_full_axes();
        let err = plot.render_frame(&mut other, 1).expect_err("foreign figure");
        assert!(matches!(err, DataViewError::InvalidHandle(_)));
        assert_eq!(plot.handles().len(), 1);

        plot.render_frame(&mut figure, 1).expect("time 7");
        assert_eq!(spans(&figure, &plot), 1);
        assert_eq!(figure.primitive_count(), 2);
    }

    #[test]
    fn test_missing_dimension_is_unbounded() {
        let labels = vec!["time".to_string()];
        let key = Key::scalar(3.0);
        let gate = interval("depth", Some(100.0), Some(200.0));
        assert!(is_active(&labels, false, &key, Some(&gate)));
        let gate = interval("time", None, Some(2.0));
        assert!(!is_active(&labels, false, &key, Some(&gate)));
        assert!(is_active(&labels, true, &key, Some(&gate)));
    }
}
