use plotgrid::sink::{apply_command, SinkEffect};
use plotgrid::{channel, DataSource, InMemoryRegistry, SourceRegistry};

#[test]
fn streamed_rows_reach_the_registry() {
    let (sink, rx) = channel();
    let mut reg = InMemoryRegistry::new();
    sink.load(DataSource::new("live.csv", Vec::new())).unwrap();
    sink.set_streaming(true).unwrap();
    sink.append_row("live.csv", 0.0, [("a", 1.0)]).unwrap();
    sink.append_row("live.csv", 1.0, [("a", 2.0)]).unwrap();

    let effects: Vec<SinkEffect> = rx.try_iter().map(|c| apply_command(&mut reg, c)).collect();
    assert_eq!(
        effects,
        vec![
            SinkEffect::SourcesChanged,
            SinkEffect::DataChanged,
            SinkEffect::SourcesChanged,
            SinkEffect::DataChanged,
        ]
    );
    assert!(reg.is_streaming());
    let src = reg.source(0).unwrap();
    assert_eq!(src.time(), &[0.0, 1.0]);
    assert_eq!(src.signal("a").unwrap(), &[1.0, 2.0]);
}

#[test]
fn reloading_a_path_keeps_its_slot() {
    let (sink, rx) = channel();
    let mut reg = InMemoryRegistry::new();
    sink.load(DataSource::new("a.csv", vec![0.0])).unwrap();
    sink.load(DataSource::new("b.csv", vec![0.0])).unwrap();
    sink.load(DataSource::new("a.csv", vec![0.0, 1.0])).unwrap();
    for command in rx.try_iter() {
        apply_command(&mut reg, command);
    }
    assert_eq!(reg.slot_count(), 2);
    assert_eq!(reg.source(0).unwrap().time().len(), 2);
}

#[test]
fn unknown_paths_are_ignored() {
    let mut reg = InMemoryRegistry::new();
    let (sink, rx) = channel();
    sink.unload("nope.csv").unwrap();
    sink.append_row("nope.csv", 0.0, [("x", 1.0)]).unwrap();
    let effects: Vec<SinkEffect> = rx.try_iter().map(|c| apply_command(&mut reg, c)).collect();
    assert_eq!(effects, vec![SinkEffect::Ignored, SinkEffect::Ignored]);
}

#[test]
fn derived_signals_are_registered() {
    let (sink, rx) = channel();
    let mut reg = InMemoryRegistry::new();
    sink.set_derived("power", vec![0.0], vec![5.0]).unwrap();
    for command in rx.try_iter() {
        apply_command(&mut reg, command);
    }
    assert_eq!(reg.derived().names(), vec!["power".to_string()]);
}

#[test]
fn repeated_column_in_streamed_row_stays_aligned() {
    let (sink, rx) = channel();
    let mut reg = InMemoryRegistry::new();
    sink.load(DataSource::new("live.csv", vec![0.0]).with_signal("a", vec![10.0])).unwrap();
    sink.append_row("live.csv", 1.0, [("a", 11.0), ("a", 99.0)]).unwrap();
    sink.append_row("live.csv", 2.0, [("a", 12.0)]).unwrap();
    for command in rx.try_iter() {
        apply_command(&mut reg, command);
    }
    let src = reg.source(0).unwrap();
    assert_eq!(src.time().len(), src.signal("a").unwrap().len());
    assert_eq!(src.signal("a").unwrap(), &[10.0, 99.0, 12.0]);
}
