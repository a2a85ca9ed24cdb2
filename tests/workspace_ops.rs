use std::time::{Duration, Instant};

use plotgrid::linking::group_of;
use plotgrid::{DataSource, InMemoryRegistry, PlotGrid, SignalRef, SubplotMode, XAxisSelection};

#[test]
fn toggling_mode_discards_both_binding_lists() {
    let mut grid = PlotGrid::default();
    let x = SignalRef::new(0, "x");
    let y = SignalRef::new(0, "y");
    grid.assign(0, 0, y.clone());

    assert_eq!(grid.toggle_tuple_mode(0, 0), Some(SubplotMode::TupleXY));
    let sp = grid.workspace().subplot(0, 0).unwrap();
    assert!(sp.signals().is_empty() && sp.pairs().is_empty());

    grid.add_tuple_pair(0, 0, x, y, None);
    assert_eq!(grid.toggle_tuple_mode(0, 0), Some(SubplotMode::Regular));
    let sp = grid.workspace().subplot(0, 0).unwrap();
    assert!(sp.signals().is_empty() && sp.pairs().is_empty());

    assert_eq!(grid.toggle_tuple_mode(0, 0), Some(SubplotMode::TupleXY));
    assert!(grid.workspace().subplot(0, 0).unwrap().pairs().is_empty());
}

#[test]
fn mode_specific_operations_are_rejected_in_the_wrong_mode() {
    let mut grid = PlotGrid::default();
    assert!(!grid.add_tuple_pair(0, 0, SignalRef::new(0, "x"), SignalRef::new(0, "y"), None));
    grid.toggle_tuple_mode(0, 0);
    assert!(!grid.assign(0, 0, SignalRef::new(0, "x")));
    assert!(!grid.remove_tuple_pair(0, 0, 0));
}

#[test]
fn duplicate_assign_is_a_no_op() {
    let mut grid = PlotGrid::default();
    assert!(grid.assign(0, 0, SignalRef::new(0, "x")));
    assert!(!grid.assign(0, 0, SignalRef::new(0, "x")));
    assert_eq!(grid.workspace().subplot(0, 0).unwrap().signals().len(), 1);
}

#[test]
fn out_of_range_indices_degrade_to_no_ops() {
    let mut grid = PlotGrid::default();
    assert!(!grid.assign(3, 0, SignalRef::new(0, "x")));
    assert!(!grid.assign(0, 5, SignalRef::new(0, "x")));
    assert!(!grid.unassign(0, 5, &SignalRef::new(0, "x")));
    assert!(!grid.set_x_axis(2, 0, XAxisSelection::Time));
    assert!(grid.toggle_tuple_mode(0, 9).is_none());
    assert!(!grid.clear_subplot(1, 0));
    assert!(!grid.select_tab(4, Instant::now()));
    assert!(!grid.select_subplot(1));
    assert!(!grid.set_linking(7, true));
    assert!(grid.pan_zoom(0, 3, (0.0, 1.0)).is_empty());
    assert!(!grid.close_tab(0), "last tab stays");
    assert_eq!(grid.workspace().tab_count(), 1);
}

#[test]
fn clear_subplot_empties_bindings_but_keeps_axis_settings() {
    let mut grid = PlotGrid::default();
    grid.assign(0, 0, SignalRef::new(0, "x"));
    grid.assign(0, 0, SignalRef::new(0, "y"));
    grid.set_x_axis(0, 0, XAxisSelection::Signal(SignalRef::new(0, "t")));
    assert!(grid.clear_subplot(0, 0));
    let sp = grid.workspace().subplot(0, 0).unwrap();
    assert!(sp.signals().is_empty());
    assert_eq!(sp.x_axis, XAxisSelection::Signal(SignalRef::new(0, "t")));
    assert!(!grid.index().bound_elsewhere("x", 0, 1));
}

#[test]
fn linked_subplots_share_x_range() {
    let mut grid = PlotGrid::default();
    grid.resize(0, 2, 2);
    grid.set_x_axis(0, 3, XAxisSelection::Signal(SignalRef::new(0, "rpm")));
    assert!(grid.set_linking(0, true));

    let tab = grid.workspace().tab(0).unwrap();
    let group = group_of(tab, 0).unwrap();
    assert_eq!(group.members, vec![0, 1, 2]);
    assert!(group_of(tab, 3).is_none(), "a lone custom-X subplot has no partners");

    let changed = grid.pan_zoom(0, 1, (5.0, 8.0));
    assert_eq!(changed, vec![0, 1, 2]);
    let tab = grid.workspace().tab(0).unwrap();
    for i in 0..3 {
        assert_eq!(tab.surface(i).unwrap().limits.unwrap().x, (5.0, 8.0));
    }
    assert!(tab.surface(3).unwrap().limits.is_none());
}

#[test]
fn tuple_subplots_never_link() {
    let mut grid = PlotGrid::default();
    grid.resize(0, 1, 3);
    grid.toggle_tuple_mode(0, 2);
    grid.set_linking(0, true);
    let tab = grid.workspace().tab(0).unwrap();
    assert_eq!(group_of(tab, 0).unwrap().members, vec![0, 1]);
    assert!(group_of(tab, 2).is_none());
}

#[test]
fn disabling_linking_isolates_pan_zoom() {
    let mut grid = PlotGrid::default();
    grid.resize(0, 1, 2);
    grid.set_linking(0, true);
    grid.set_linking(0, false);
    assert_eq!(grid.pan_zoom(0, 0, (1.0, 2.0)), vec![0]);
    let tab = grid.workspace().tab(0).unwrap();
    assert!(tab.surfaces().iter().all(|s| s.link_group.is_none()));
}

#[test]
fn links_are_recomputed_after_resize() {
    let mut grid = PlotGrid::default();
    grid.set_linking(0, true);
    grid.resize(0, 2, 1);
    let tab = grid.workspace().tab(0).unwrap();
    assert_eq!(group_of(tab, 1).unwrap().members, vec![0, 1]);
}

#[test]
fn tab_switch_refresh_is_deferred_and_coalesced() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("a.csv", vec![0.0]).with_signal("y", vec![1.0]));
    let mut grid = PlotGrid::default();
    grid.sources_changed(&reg);
    grid.add_tab();
    grid.resize(1, 2, 2);
    grid.assign(0, 0, SignalRef::new(a, "y"));

    let now = Instant::now();
    assert!(grid.select_tab(1, now));
    assert_eq!(grid.workspace().selected_tab(), 1, "selection changes immediately");
    assert!(grid.select_tab(0, now));
    assert!(grid.tick(&reg, now).is_none(), "not due yet");

    let wait = grid.continuation_due_in(now).unwrap();
    assert!(wait > Duration::ZERO && wait <= Duration::from_secs(1));

    let later = now + Duration::from_secs(1);
    assert_eq!(grid.continuation_due_in(later), Some(Duration::ZERO));
    let stats = grid.tick(&reg, later).unwrap();
    assert_eq!(stats.subplots, 1, "only the latest switch (tab 0, 1x1) runs");
    assert_eq!(grid.workspace().tab(0).unwrap().surfaces()[0].series.len(), 1);
    assert!(grid.tick(&reg, later).is_none());
    assert!(grid.continuation_due_in(later).is_none());
}

#[test]
fn deferred_refresh_for_closed_tab_is_dropped() {
    let reg = InMemoryRegistry::new();
    let mut grid = PlotGrid::default();
    grid.add_tab();
    let now = Instant::now();
    grid.select_tab(1, now);
    grid.close_tab(1);
    assert!(grid.tick(&reg, now + Duration::from_secs(1)).is_none());
}

#[test]
fn closing_tab_keeps_names_consistent() {
    let mut reg = InMemoryRegistry::new();
    let a = reg.add_source(DataSource::new("a.csv", vec![0.0]).with_signal("y", vec![1.0]));
    let mut grid = PlotGrid::default();
    grid.sources_changed(&reg);
    grid.add_tab();
    grid.assign(0, 0, SignalRef::new(a, "y"));
    grid.assign(1, 0, SignalRef::new(a, "y"));
    assert!(grid.close_tab(1));
    grid.refresh(&reg, None);
    assert_eq!(grid.workspace().tab(0).unwrap().surfaces()[0].series[0].name, "y");
}

#[test]
fn new_tabs_get_sequential_titles() {
    let mut grid = PlotGrid::default();
    grid.add_tab();
    assert!(grid.set_tab_title(0, "Engine"));
    let titles: Vec<&str> = grid.workspace().tabs().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Engine", "Tab 2"]);
}
