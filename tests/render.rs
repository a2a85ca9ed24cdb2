use plotgrid::{DataSource, DrawnKind, InMemoryRegistry, PlotGrid, PlotGridConfig, PlotLimits, PlotSurface, SignalRef, XAxisSelection};

fn surface(grid: &PlotGrid, subplot: usize) -> &PlotSurface {
    grid.workspace().tab(0).unwrap().surface(subplot).unwrap()
}

fn grid_with(reg: &InMemoryRegistry) -> PlotGrid {
    let mut grid = PlotGrid::default();
    grid.sources_changed(reg);
    grid
}

#[test]
fn static_refresh_fits_exactly_and_drops_manual_limits() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("a.csv", vec![0.0, 1.0, 2.0, 3.0]).with_signal("v", vec![1.0, 5.0, 2.0, 3.0]));
    let mut grid = grid_with(&reg);
    grid.assign(0, 0, SignalRef::new(a, "v"));
    grid.refresh(&reg, None);
    assert_eq!(surface(&grid, 0).limits, Some(PlotLimits::new((0.0, 3.0), (1.0, 5.0))));

    grid.pan_zoom(0, 0, (10.0, 20.0));
    assert_eq!(surface(&grid, 0).limits.unwrap().x, (10.0, 20.0));
    grid.refresh(&reg, None);
    let s = surface(&grid, 0);
    assert_eq!(s.limits, Some(PlotLimits::new((0.0, 3.0), (1.0, 5.0))));
    assert!(s.manual_limits.is_none());
}

#[test]
fn streaming_refresh_never_shrinks_limits() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("live.csv", vec![0.0, 1.0, 2.0, 3.0]).with_signal("v", vec![0.0, 4.0, -2.0, 1.0]));
    reg.set_streaming(true);
    let mut grid = grid_with(&reg);
    grid.assign(0, 0, SignalRef::new(a, "v"));
    grid.refresh(&reg, None);
    let before = surface(&grid, 0).limits.unwrap();

    // New frame's data is a subset of what was visible.
    reg.replace_source(a, DataSource::new("live.csv", vec![1.0, 2.0]).with_signal("v", vec![1.0, 2.0]));
    grid.refresh(&reg, None);
    let after = surface(&grid, 0).limits.unwrap();
    assert!(after.contains(&before), "{after:?} should contain {before:?}");
}

#[test]
fn streaming_updates_series_in_place() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("live.csv", vec![0.0]).with_signal("v", vec![1.0]));
    reg.set_streaming(true);
    let mut grid = grid_with(&reg);
    grid.assign(0, 0, SignalRef::new(a, "v"));
    grid.refresh(&reg, None);

    reg.source_mut(a).unwrap().append_row(1.0, [("v", 2.0)]);
    let stats = grid.refresh(&reg, None);
    let s = surface(&grid, 0);
    assert_eq!(s.series.len(), 1);
    assert_eq!(s.series[0].points, vec![[0.0, 1.0], [1.0, 2.0]]);
    assert_eq!(stats.removed, 0);
}

#[test]
fn streaming_removes_series_that_are_no_longer_bound() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(
        DataSource::new("live.csv", vec![0.0, 1.0])
            .with_signal("v", vec![1.0, 2.0])
            .with_signal("w", vec![3.0, 4.0]),
    );
    reg.set_streaming(true);
    let mut grid = grid_with(&reg);
    grid.assign(0, 0, SignalRef::new(a, "v"));
    grid.assign(0, 0, SignalRef::new(a, "w"));
    grid.refresh(&reg, None);
    grid.unassign(0, 0, &SignalRef::new(a, "w"));
    let stats = grid.refresh(&reg, None);
    assert_eq!(stats.removed, 1);
    assert!(surface(&grid, 0).series.iter().all(|s| s.name != "w"));
}

#[test]
fn long_series_are_decimated_keeping_endpoints() {
    let n = 120_000;
    let time: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let values: Vec<f64> = (0..n).map(|i| (i as f64 * 0.001).sin()).collect();
    let (first, last) = ([time[0], values[0]], [time[n - 1], values[n - 1]]);
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("big.csv", time).with_signal("v", values));
    let mut grid = grid_with(&reg);
    grid.assign(0, 0, SignalRef::new(a, "v"));
    grid.refresh(&reg, None);

    let pts = &surface(&grid, 0).series[0].points;
    assert!(pts.len() <= 50_001, "got {} points", pts.len());
    assert_eq!(pts[0], first);
    assert_eq!(*pts.last().unwrap(), last);
}

#[test]
fn max_points_comes_from_config() {
    let time: Vec<f64> = (0..1000).map(|i| i as f64).collect();
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("a.csv", time.clone()).with_signal("v", time));
    let mut grid = PlotGrid::new(PlotGridConfig {
        max_points: 100,
        ..PlotGridConfig::default()
    });
    grid.sources_changed(&reg);
    grid.assign(0, 0, SignalRef::new(a, "v"));
    grid.refresh(&reg, None);
    assert!(surface(&grid, 0).series[0].points.len() <= 101);
}

#[test]
fn state_signals_render_as_change_markers() {
    let mut src = DataSource::new("a.csv", vec![0.0, 1.0, 2.0, 3.0, 4.0]).with_signal("valve", vec![0.0, 0.0, 1.0, 1.0, 0.0]);
    src.set_state("valve", true);
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(src);
    let mut grid = grid_with(&reg);
    grid.assign(0, 0, SignalRef::new(a, "valve"));
    grid.refresh(&reg, None);

    let series = &surface(&grid, 0).series[0];
    assert_eq!(series.kind, DrawnKind::Markers);
    assert_eq!(series.points, vec![[0.0, 0.0], [2.0, 1.0], [4.0, 0.0]]);
}

#[test]
fn unresolvable_references_are_skipped_individually() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("a.csv", vec![0.0, 1.0]).with_signal("v", vec![1.0, 2.0]));
    let mut grid = grid_with(&reg);
    grid.assign(0, 0, SignalRef::new(a, "v"));
    grid.assign(0, 0, SignalRef::new(7, "v"));
    grid.assign(0, 0, SignalRef::new(a, "missing"));
    let stats = grid.refresh(&reg, None);

    assert_eq!(stats.skipped, 2);
    assert_eq!(surface(&grid, 0).series.len(), 1);
}

#[test]
fn unloaded_source_keeps_binding_but_draws_nothing() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("a.csv", vec![0.0, 1.0]).with_signal("v", vec![1.0, 2.0]));
    let mut grid = grid_with(&reg);
    grid.assign(0, 0, SignalRef::new(a, "v"));
    reg.remove_source(a);
    grid.source_removed(a);
    grid.refresh(&reg, None);

    assert_eq!(grid.workspace().subplot(0, 0).unwrap().signals().len(), 1);
    assert!(surface(&grid, 0).series.is_empty());
    assert_eq!(surface(&grid, 0).limits, Some(PlotLimits::new((0.0, 1.0), (0.0, 1.0))));
}

#[test]
fn scaling_factor_multiplies_values() {
    let mut src = DataSource::new("a.csv", vec![0.0, 1.0]).with_signal("v", vec![1.0, 2.0]);
    src.set_scale("v", 10.0);
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(src);
    let mut grid = grid_with(&reg);
    grid.assign(0, 0, SignalRef::new(a, "v"));
    grid.refresh(&reg, None);
    assert_eq!(surface(&grid, 0).series[0].points, vec![[0.0, 10.0], [1.0, 20.0]]);
}

#[test]
fn non_finite_samples_are_dropped() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("a.csv", vec![0.0, 1.0, 2.0]).with_signal("v", vec![1.0, f64::NAN, 3.0]));
    let mut grid = grid_with(&reg);
    grid.assign(0, 0, SignalRef::new(a, "v"));
    grid.refresh(&reg, None);
    assert_eq!(surface(&grid, 0).series[0].points, vec![[0.0, 1.0], [2.0, 3.0]]);
}

#[test]
fn custom_x_signal_from_same_source() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(
        DataSource::new("a.csv", vec![0.0, 1.0, 2.0])
            .with_signal("rpm", vec![100.0, 200.0, 300.0])
            .with_signal("torque", vec![1.0, 2.0, 3.0]),
    );
    let mut grid = grid_with(&reg);
    grid.assign(0, 0, SignalRef::new(a, "torque"));
    grid.set_x_axis(0, 0, XAxisSelection::Signal(SignalRef::new(a, "rpm")));
    grid.refresh(&reg, None);

    let s = surface(&grid, 0);
    assert_eq!(s.series[0].points, vec![[100.0, 1.0], [200.0, 2.0], [300.0, 3.0]]);
    assert_eq!(s.x_label.as_deref(), Some("rpm"));
}

#[test]
fn custom_x_signal_on_other_time_grid_is_resampled() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("a.csv", vec![0.0, 2.0]).with_signal("y", vec![0.0, 20.0]));
    let b = reg.add_source(DataSource::new("b.csv", vec![0.0, 1.0, 2.0]).with_signal("x", vec![5.0, 6.0, 7.0]));
    let mut grid = grid_with(&reg);
    grid.assign(0, 0, SignalRef::new(a, "y"));
    grid.set_x_axis(0, 0, XAxisSelection::Signal(SignalRef::new(b, "x")));
    grid.refresh(&reg, None);

    assert_eq!(surface(&grid, 0).series[0].points, vec![[5.0, 0.0], [6.0, 10.0], [7.0, 20.0]]);
}

#[test]
fn missing_custom_x_falls_back_to_time() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("a.csv", vec![0.0, 1.0]).with_signal("y", vec![3.0, 4.0]));
    let mut grid = grid_with(&reg);
    grid.assign(0, 0, SignalRef::new(a, "y"));
    grid.set_x_axis(0, 0, XAxisSelection::Signal(SignalRef::new(a, "gone")));
    grid.refresh(&reg, None);

    let s = surface(&grid, 0);
    assert_eq!(s.series[0].points, vec![[0.0, 3.0], [1.0, 4.0]]);
    assert_eq!(s.x_label.as_deref(), Some("Time"));
}

#[test]
fn custom_y_label_is_applied() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("a.csv", vec![0.0]).with_signal("y", vec![1.0]));
    let mut grid = grid_with(&reg);
    grid.assign(0, 0, SignalRef::new(a, "y"));
    grid.set_custom_y_label(0, 0, Some("Pressure [bar]".into()));
    grid.refresh(&reg, None);
    assert_eq!(surface(&grid, 0).y_label.as_deref(), Some("Pressure [bar]"));
}

#[test]
fn explicit_color_overrides_palette() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("a.csv", vec![0.0]).with_signal("y", vec![1.0]));
    let mut grid = grid_with(&reg);
    let y = SignalRef::new(a, "y");
    grid.assign(0, 0, y.clone());
    grid.set_signal_color(y, egui::Color32::RED);
    grid.refresh(&reg, None);
    assert_eq!(surface(&grid, 0).series[0].color, egui::Color32::RED);
}

#[test]
fn derived_signals_render_like_source_signals() {
    let mut reg = InMemoryRegistry::new();
    reg.derived.insert("sum", vec![0.0, 1.0], vec![2.0, 4.0]);
    let mut grid = grid_with(&reg);
    grid.assign(0, 0, SignalRef::derived("sum"));
    grid.refresh(&reg, None);
    let s = surface(&grid, 0);
    assert_eq!(s.series[0].name, "sum");
    assert_eq!(s.series[0].points, vec![[0.0, 2.0], [1.0, 4.0]]);
}

#[test]
fn tuple_pairs_plot_y_against_x() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(
        DataSource::new("a.csv", vec![0.0, 1.0, 2.0])
            .with_signal("Temp", vec![10.0, 20.0, 30.0])
            .with_signal("Pressure", vec![1.0, 2.0, 3.0]),
    );
    let mut grid = grid_with(&reg);
    grid.toggle_tuple_mode(0, 0);
    assert!(grid.add_tuple_pair(0, 0, SignalRef::new(a, "Temp"), SignalRef::new(a, "Pressure"), None));
    grid.refresh(&reg, None);

    let s = surface(&grid, 0);
    assert_eq!(s.series[0].name, "Pressure vs Temp");
    assert_eq!(s.series[0].points, vec![[10.0, 1.0], [20.0, 2.0], [30.0, 3.0]]);
    assert_eq!(s.x_label.as_deref(), Some("Temp"));
    assert_eq!(s.y_label.as_deref(), Some("Pressure"));
}

#[test]
fn several_tuple_pairs_leave_axes_unlabelled() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(
        DataSource::new("a.csv", vec![0.0, 1.0])
            .with_signal("x", vec![0.0, 1.0])
            .with_signal("y", vec![1.0, 2.0])
            .with_signal("z", vec![3.0, 4.0]),
    );
    let mut grid = grid_with(&reg);
    grid.toggle_tuple_mode(0, 0);
    grid.add_tuple_pair(0, 0, SignalRef::new(a, "x"), SignalRef::new(a, "y"), None);
    grid.add_tuple_pair(0, 0, SignalRef::new(a, "x"), SignalRef::new(a, "z"), Some("custom".into()));
    grid.refresh(&reg, None);

    let s = surface(&grid, 0);
    let names: Vec<&str> = s.series.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["y vs x", "custom"]);
    assert_ne!(s.series[0].color, s.series[1].color);
    assert!(s.x_label.is_none());
    assert!(s.y_label.is_none());
}

#[test]
fn refresh_can_target_single_tab() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("a.csv", vec![0.0]).with_signal("y", vec![1.0]));
    let mut grid = grid_with(&reg);
    grid.add_tab();
    grid.assign(0, 0, SignalRef::new(a, "y"));
    grid.assign(1, 0, SignalRef::new(a, "y"));
    let stats = grid.refresh(&reg, Some(&[1, 9]));
    assert_eq!(stats.subplots, 1);
    assert!(surface(&grid, 0).series.is_empty());
}

mod decimation {
    use plotgrid::render::series::{decimate, Series};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn keeps_endpoints_and_bound(n in 2usize..5000, max in 1usize..600) {
            let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
            let series = Series { x: x.clone(), y: x };
            let out = decimate(series, max);
            prop_assert!(out.len() <= n.min(max + 1));
            prop_assert_eq!(out.x[0], 0.0);
            prop_assert_eq!(*out.x.last().unwrap(), (n - 1) as f64);
            prop_assert!(out.x.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

#[test]
fn emptied_subplot_keeps_its_panned_view() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("a.csv", vec![0.0, 1.0, 2.0, 3.0]).with_signal("v", vec![1.0, 5.0, 2.0, 3.0]));
    let mut grid = grid_with(&reg);
    let v = SignalRef::new(a, "v");
    grid.assign(0, 0, v.clone());
    grid.refresh(&reg, None);
    grid.pan_zoom(0, 0, (10.0, 20.0));

    grid.unassign(0, 0, &v);
    grid.refresh(&reg, None);
    let s = surface(&grid, 0);
    assert!(s.series.is_empty());
    assert_eq!(s.limits, Some(PlotLimits::new((10.0, 20.0), (1.0, 5.0))));
    assert_eq!(s.manual_limits, s.limits);
}

#[test]
fn fresh_empty_subplot_gets_configured_default_range() {
    let reg = InMemoryRegistry::new();
    let mut grid = PlotGrid::new(PlotGridConfig {
        default_x_range: [-5.0, 5.0],
        default_y_range: [0.0, 100.0],
        ..PlotGridConfig::default()
    });
    grid.refresh(&reg, None);
    assert_eq!(surface(&grid, 0).limits, Some(PlotLimits::new((-5.0, 5.0), (0.0, 100.0))));
}
