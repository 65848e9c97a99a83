use approx_eq::assert_approx_eq;
use dataviews::plotting::{
    self, DataCurvePlot, DataHistogramPlot, OverlayPlot, Plot, PlotContext, PlotRegistry, SheetViewPlot,
    clamp_frame,
};
use dataviews::views::annotation::interval;
use dataviews::views::{
    Annotation, Bounds, CellValue, DataCurves, DataHistogram, Overlay, SheetView, Stack, TableView,
    ViewKind,
};
use dataviews::{DataViewError, PlotSettings};
use ndarray::{Array2, array};

fn unit() -> Bounds {
    Bounds::new(0.0, 0.0, 1.0, 1.0)
}

fn raster_stack(frames: usize) -> Stack {
    Stack::from_items(
        vec!["time"],
        (0..frames).map(|t| (t as f64, SheetView::new(Array2::from_elem((3, 3), t as f64), unit()))),
    )
    .expect("valid stack")
}

#[test]
fn test_clamp_is_idempotent() {
    for count in 1..6 {
        for n in 0..10 {
            let once = clamp_frame(n, count);
            assert_eq!(clamp_frame(once, count), once);
            assert!(once < count);
        }
    }

    let mut plot = SheetViewPlot::new(raster_stack(4), PlotContext::default()).expect("plot");
    let mut figure = plot.render().expect("render");
    let image = plot.image_handle().expect("image");

    plot.render_frame(&mut figure, 3).expect("last frame");
    let last = format!("{figure:?}");
    assert_eq!(figure.image(image).expect("image").0[[0, 0, 0]], 3.0);

    plot.render_frame(&mut figure, 0).expect("first frame");
    assert_ne!(format!("{figure:?}"), last);
    plot.render_frame(&mut figure, 3 + 5).expect("past the end");
    assert_eq!(format!("{figure:?}"), last);
}

#[test]
fn test_bare_view_is_a_single_frame() {
    let data = Array2::from_shape_fn((2, 3), |(r, c)| (r * 3 + c) as f64);
    let sheet = SheetView::new(data, unit());
    let mut plot = SheetViewPlot::new(sheet.clone(), PlotContext::default()).expect("sheet plot");
    assert_eq!(plot.frame_count(), 1);

    let mut figure = plot.render().expect("render");
    let before = format!("{figure:?}");
    plot.render_frame(&mut figure, 0).expect("frame 0");
    assert_eq!(format!("{figure:?}"), before);
    plot.render_frame(&mut figure, 7).expect("clamped frame");
    assert_eq!(format!("{figure:?}"), before);

    let mut boxed = plotting::plot(sheet).expect("boxed plot");
    assert!(boxed.snapshot(7).is_ok());
}

#[test]
fn test_animation_visits_requested_frames() {
    let plot = plotting::plot(raster_stack(5)).expect("plot");
    let mut animation = plot.animate(1, Some(4), 25.0).expect("animation");
    assert_eq!(animation.frames(), &[1, 2, 3]);
    assert_approx_eq!(animation.interval_ms(), 40.0, 1e-9);

    let mut seen = Vec::new();
    animation
        .run(|frame, figure| {
            assert_eq!(figure.axes_count(), 1);
            seen.push(frame);
            Ok(())
        })
        .expect("run");
    assert_eq!(seen, vec![1, 2, 3]);
    assert_eq!(animation.step().expect("exhausted"), None);

    animation.rewind();
    assert_eq!(animation.step().expect("rewound"), Some(1));
}

#[test]
fn test_animation_rejects_bad_fps() {
    let plot = plotting::plot(raster_stack(2)).expect("plot");
    assert!(matches!(
        plot.animate(0, None, 0.0),
        Err(DataViewError::InvalidParameter { .. })
    ));
}

#[test]
fn test_cyclic_curve_is_closed() {
    let curves = DataCurves::new(vec![array![[0.0, 1.0], [90.0, 3.0], [180.0, 2.0], [270.0, 0.5]]])
        .expect("curves")
        .with_cyclic_range(360.0);
    let settings = PlotSettings {
        center: false,
        ..PlotSettings::default()
    };
    let mut plot = DataCurvePlot::new(curves.clone(), PlotContext::default().with_settings(settings))
        .expect("curve plot");
    let figure = plot.render().expect("render");

    let axes = figure.axes_handles().next().expect("axes");
    let primitives = figure.primitives_on(axes).expect("primitives");
    assert_eq!(primitives.len(), 1);

    let paths = figure.paths(plot.lines_handle().expect("lines")).expect("paths");
    assert_eq!(paths[0].len(), 5);
    assert_eq!(paths[0][0], [0.0, 1.0]);
    assert_eq!(paths[0][4], [0.0 + 360.0, 1.0]);

    // Centering puts the peak mid-curve; the closing point repeats the rotated start.
    let mut centered = DataCurvePlot::new(curves.clone(), PlotContext::default()).expect("curve plot");
    let figure = centered.render().expect("render");
    let paths = figure.paths(centered.lines_handle().expect("lines")).expect("paths");
    let ys: Vec<f64> = paths[0].iter().map(|p| p[1]).collect();
    assert_eq!(ys, vec![0.5, 1.0, 3.0, 2.0, 0.5]);
    assert_eq!(paths[0][4], [0.0 + 360.0, 0.5]);

    // The view itself is untouched by the closing point.
    assert_eq!(curves.data()[0].nrows(), 4);
}

#[test]
fn test_style_cycles_within_group() {
    let curve = |group: &str| {
        DataCurves::new(vec![array![[0.0, 0.0], [1.0, 1.0]]])
            .expect("curves")
            .with_style(group)
    };
    let overlay = Overlay::new(vec![
        curve("a").into(),
        curve("a").into(),
        curve("a").into(),
        curve("b").into(),
    ])
    .expect("overlay");
    let plot = OverlayPlot::new(overlay, PlotContext::default()).expect("overlay plot");
    assert_eq!(plot.cyclic_indices(), vec![0, 1, 2, 0]);
}

#[test]
fn test_annotation_follows_interval() {
    let frames = (0..3).map(|t| {
        let sheet = SheetView::new(Array2::from_elem((2, 2), 1.0), unit());
        let marks = Annotation::new().vline(0.5, Some(interval("time", Some(0.0), Some(1.0))));
        let overlay = Overlay::new(vec![sheet.into(), marks.into()]).expect("overlay");
        (t as f64, overlay)
    });
    let stack = Stack::from_items(vec!["time"], frames).expect("stack");
    let mut plot = plotting::plot(stack).expect("plot");

    let mut figure = plot.render().expect("render");
    assert_eq!(figure.primitive_count(), 1);
    plot.render_frame(&mut figure, 1).expect("frame 1");
    assert_eq!(figure.primitive_count(), 2);
    plot.render_frame(&mut figure, 0).expect("frame 0");
    assert_eq!(figure.primitive_count(), 1);

    let capacity = figure.slot_capacity();
    for step in 0..1000 {
        plot.render_frame(&mut figure, step % 3).expect("frame");
    }
    assert_eq!(figure.slot_capacity(), capacity);
    // 999 % 3 lands on time 0, outside the interval
    assert_eq!(figure.primitive_count(), 1);
}

#[test]
fn test_histogram_bin_mismatch_is_structural() {
    let narrow = DataHistogram::new(vec![1.0, 2.0], vec![0.0, 1.0, 2.0]).expect("hist");
    let wide = DataHistogram::new(vec![1.0, 2.0, 3.0], vec![0.0, 1.0, 2.0, 3.0]).expect("hist");
    let stack = Stack::from_items(vec!["time"], vec![(0.0, wide), (1.0, narrow)]).expect("stack");

    let mut plot = DataHistogramPlot::new(stack, PlotContext::default()).expect("plot");
    let mut figure = plot.render().expect("render");
    let bars = plot.bars_handle().expect("bars");
    assert_eq!(figure.bar_count(bars).expect("count"), 2);

    assert!(matches!(
        plot.render_frame(&mut figure, 0),
        Err(DataViewError::Structure(_))
    ));
    assert_eq!(figure.bar_count(bars).expect("count"), 2);
}

#[test]
fn test_table_formatting() {
    let settings = PlotSettings {
        float_precision: 2,
        max_value_len: 8,
        ..PlotSettings::default()
    };
    assert_eq!(plotting::table::pprint(&CellValue::from(2.0_f64 / 3.0), &settings), "0.67");
    assert_eq!(
        plotting::table::pprint(&CellValue::from("a long label"), &settings),
        "a lon..."
    );

    let table = TableView::from_mapping(vec![("alpha", 1.5_f64), ("beta", 2.25)]).expect("table");
    let mut plot = plotting::plot(table).expect("table plot");
    let figure = plot.render().expect("render");
    assert_eq!(figure.axes_count(), 1);
}

#[test]
fn test_registry_covers_every_kind() {
    let standard = PlotRegistry::standard();
    assert!(standard.check_complete().is_ok());
    for kind in ViewKind::ALL.iter() {
        assert!(standard.get(*kind).is_some(), "{kind} has no renderer");
    }

    let mut partial = PlotRegistry::new();
    assert!(partial.register(ViewKind::SheetView, |source, context| plotting::plot_with(source, context)).is_none());
    assert!(partial.check_complete().is_err());
}
