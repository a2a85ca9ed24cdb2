//! Demo: two logs sharing a signal name plus one streaming source in a 2x2 grid
//!
//! What it demonstrates
//! - Loading sources whose signal names collide ("Temp" in both run folders),
//!   which makes the legend disambiguate them by folder.
//! - Streaming rows into a live source through `plotgrid::channel()`.
//! - A TupleXY subplot plotting one signal against another.
//!
//! How to run
//! ```bash
//! cargo run --example streaming_grid [config.yaml]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use plotgrid::{channel, DataSource, InMemoryRegistry, PlotGrid, PlotGridApp, PlotGridConfig, SignalRef};

fn synthetic_log(path: &str, phase: f64) -> DataSource {
    let time: Vec<f64> = (0..2000).map(|i| i as f64 * 0.01).collect();
    let temp = time.iter().map(|t| 20.0 + 5.0 * (t * 0.5 + phase).sin()).collect();
    let pressure = time.iter().map(|t| 1.0 + 0.1 * (t * 2.0 + phase).cos()).collect();
    let valve = time.iter().map(|t| if (t / 4.0).floor() as i64 % 2 == 0 { 0.0 } else { 1.0 }).collect();
    let mut source = DataSource::new(path, time)
        .with_signal("Temp", temp)
        .with_signal("Pressure", pressure)
        .with_signal("Valve", valve);
    source.set_state("Valve", true);
    source
}

fn main() -> eframe::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => PlotGridConfig::from_path(&PathBuf::from(path)).unwrap_or_else(|err| {
            eprintln!("could not read config: {err}; using defaults");
            PlotGridConfig::default()
        }),
        None => PlotGridConfig {
            default_rows: 2,
            default_cols: 2,
            ..PlotGridConfig::default()
        },
    };

    let mut registry = InMemoryRegistry::new();
    let a = registry.add_source(synthetic_log("runs/alpha/log.csv", 0.0));
    let b = registry.add_source(synthetic_log("runs/beta/log.csv", 1.0));
    let live = registry.add_source(DataSource::new("live/sensor.csv", Vec::new()));
    registry.set_streaming(true);

    let mut grid = PlotGrid::new(config);
    grid.sources_changed(&registry);
    grid.assign(0, 0, SignalRef::new(a, "Temp"));
    grid.assign(0, 0, SignalRef::new(b, "Temp"));
    grid.assign(0, 1, SignalRef::new(a, "Valve"));
    grid.assign(0, 2, SignalRef::new(live, "Sensor"));
    grid.toggle_tuple_mode(0, 3);
    grid.add_tuple_pair(0, 3, SignalRef::new(a, "Temp"), SignalRef::new(a, "Pressure"), None);

    let (sink, rx) = channel();
    std::thread::spawn(move || {
        let dt = Duration::from_millis(20);
        let mut n: u64 = 0;
        loop {
            let t = n as f64 * dt.as_secs_f64();
            let value = (t * 1.5).sin() + 0.2 * (t * 7.0).sin();
            // Ignore error if the UI closed (receiver dropped)
            let _ = sink.append_row("live/sensor.csv", t, [("Sensor", value)]);
            n = n.wrapping_add(1);
            std::thread::sleep(dt);
        }
    });

    let app = PlotGridApp::new(grid, registry)
        .with_receiver(rx)
        .with_snapshot_path("plotgrid_layout.json");
    plotgrid::run_plotgrid(app, eframe::NativeOptions::default())
}
