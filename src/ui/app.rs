//! The eframe application: tab strip, grid controls, signal browser and the tiled plots.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use eframe::egui;
use egui_phosphor::regular::{FLOPPY_DISK, FOLDER_OPEN, LINK, PLUS, X};
use egui_tiles::Tree;
use tracing::{info, warn};

use crate::config::PlotGridConfig;
use crate::data::signal::{SignalRef, SourceId, XAxisSelection};
use crate::data::source::{InMemoryRegistry, SourceRegistry};
use crate::data::subplot::SubplotMode;
use crate::data::tab::{GridShape, MAX_GRID_DIM};
use crate::persistence;
use crate::plot_grid::PlotGrid;
use crate::sink::{apply_command, SinkEffect, SourceCommand};
use crate::ui::plot_view::PlotViewStyle;
use crate::ui::tiles::{build_grid_tree, render_tile_grid, SubplotPaneRef};

pub struct PlotGridApp {
    grid: PlotGrid,
    registry: InMemoryRegistry,
    rx: Option<Receiver<SourceCommand>>,
    /// Cached tile trees per tab id, rebuilt when the tab's shape changes.
    trees: HashMap<u64, (GridShape, Tree<SubplotPaneRef>)>,
    snapshot_path: Option<PathBuf>,
    /// Rows and cols being edited before "Apply grid".
    shape_edit: (usize, usize),
    status: Option<String>,
}

impl PlotGridApp {
    pub fn new(grid: PlotGrid, registry: InMemoryRegistry) -> Self {
        let shape_edit = grid
            .workspace()
            .tab(grid.workspace().selected_tab())
            .map(|t| t.shape())
            .unwrap_or_default();
        let shape_edit = (shape_edit.rows(), shape_edit.cols());
        let mut app = Self {
            grid,
            registry,
            rx: None,
            trees: HashMap::new(),
            snapshot_path: None,
            shape_edit,
            status: None,
        };
        app.grid.sources_changed(&app.registry);
        app.grid.refresh(&app.registry, None);
        app
    }

    pub fn with_receiver(mut self, rx: Receiver<SourceCommand>) -> Self {
        self.rx = Some(rx);
        self
    }

    /// Enable the save/load layout buttons, reading and writing this file.
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn grid(&self) -> &PlotGrid {
        &self.grid
    }

    /// Drain pending source commands, then re-index and redraw as needed.
    fn poll_sources(&mut self) {
        let Some(rx) = &self.rx else {
            return;
        };
        let mut sources_changed = false;
        let mut data_changed = false;
        while let Ok(command) = rx.try_recv() {
            match apply_command(&mut self.registry, command) {
                SinkEffect::SourcesChanged => sources_changed = true,
                SinkEffect::DataChanged => data_changed = true,
                SinkEffect::Ignored => {}
            }
        }
        if sources_changed {
            self.grid.sources_changed(&self.registry);
        }
        if sources_changed || data_changed {
            let selected = self.grid.workspace().selected_tab();
            self.grid.refresh(&self.registry, Some(&[selected]));
        }
    }

    fn save_layout(&mut self) {
        let Some(path) = self.snapshot_path.clone() else {
            return;
        };
        let snapshot = persistence::capture(&self.grid, &self.registry);
        self.status = Some(match persistence::save_snapshot(&snapshot, &path) {
            Ok(()) => format!("Saved layout to {}", path.display()),
            Err(err) => {
                warn!(%err, "saving layout failed");
                format!("Save failed: {err}")
            }
        });
    }

    fn load_layout(&mut self) {
        let Some(path) = self.snapshot_path.clone() else {
            return;
        };
        match persistence::load_snapshot(&path) {
            Ok(snapshot) => {
                persistence::apply_source_styles(&snapshot, &mut self.registry);
                let report = persistence::restore(&mut self.grid, snapshot, &self.registry);
                self.trees.clear();
                self.grid.refresh(&self.registry, None);
                self.sync_shape_edit();
                self.status = Some(format!(
                    "Loaded {} tab(s), {} binding(s) dropped",
                    report.tabs, report.dropped
                ));
            }
            Err(err) => {
                warn!(%err, "loading layout failed");
                self.status = Some(format!("Load failed: {err}"));
            }
        }
    }

    fn sync_shape_edit(&mut self) {
        let ws = self.grid.workspace();
        if let Ok(tab) = ws.tab(ws.selected_tab()) {
            self.shape_edit = (tab.shape().rows(), tab.shape().cols());
        }
    }

    fn tab_strip(&mut self, ui: &mut egui::Ui) {
        let now = Instant::now();
        let selected = self.grid.workspace().selected_tab();
        let titles: Vec<String> = self
            .grid
            .workspace()
            .tabs()
            .iter()
            .map(|t| t.title.clone())
            .collect();
        let closable = titles.len() > 1;
        let mut close = None;
        ui.horizontal(|ui| {
            for (i, title) in titles.iter().enumerate() {
                if ui.selectable_label(i == selected, title).clicked() && i != selected {
                    self.grid.select_tab(i, now);
                    self.sync_shape_edit();
                }
                if closable && ui.small_button(X).on_hover_text("Close tab").clicked() {
                    close = Some(i);
                }
                ui.separator();
            }
            if ui.button(PLUS).on_hover_text("New tab").clicked() {
                let index = self.grid.add_tab();
                self.grid.select_tab(index, now);
                self.sync_shape_edit();
            }
        });
        if let Some(i) = close {
            if let Ok(id) = self.grid.workspace().tab(i).map(|t| t.id()) {
                self.trees.remove(&id);
            }
            self.grid.close_tab(i);
            self.sync_shape_edit();
        }
    }

    fn grid_controls(&mut self, ui: &mut egui::Ui) {
        let tab = self.grid.workspace().selected_tab();
        let subplot = self.grid.workspace().selected_subplot();
        ui.horizontal(|ui| {
            ui.label("Rows");
            ui.add(egui::DragValue::new(&mut self.shape_edit.0).range(1..=MAX_GRID_DIM));
            ui.label("Cols");
            ui.add(egui::DragValue::new(&mut self.shape_edit.1).range(1..=MAX_GRID_DIM));
            if ui.button("Apply grid").clicked() && self.grid.resize(tab, self.shape_edit.0, self.shape_edit.1) {
                self.grid.refresh(&self.registry, Some(&[tab]));
            }
            ui.separator();

            let mut linked = self
                .grid
                .workspace()
                .tab(tab)
                .map(|t| t.linking_enabled())
                .unwrap_or(false);
            if ui.checkbox(&mut linked, format!("{LINK} Link X axes")).changed() {
                self.grid.set_linking(tab, linked);
            }
            ui.separator();

            let mode = self
                .grid
                .workspace()
                .subplot(tab, subplot)
                .map(|s| s.mode())
                .unwrap_or(SubplotMode::Regular);
            let mut tuple = mode == SubplotMode::TupleXY;
            if ui.checkbox(&mut tuple, "X/Y pairs").changed() && self.grid.toggle_tuple_mode(tab, subplot).is_some() {
                self.grid.refresh(&self.registry, Some(&[tab]));
            }
            if ui.button("Clear subplot").clicked() && self.grid.clear_subplot(tab, subplot) {
                self.grid.refresh(&self.registry, Some(&[tab]));
            }

            if self.snapshot_path.is_some() {
                ui.separator();
                if ui.button(format!("{FLOPPY_DISK} Save layout")).clicked() {
                    self.save_layout();
                }
                if ui.button(format!("{FOLDER_OPEN} Load layout")).clicked() {
                    self.load_layout();
                }
            }
        });
        if let Some(status) = &self.status {
            ui.small(status);
        }
    }

    /// Every loaded signal, grouped by source. Clicking toggles the binding on
    /// the selected subplot; in X/Y mode a pair is added against the X axis signal.
    fn signal_browser(&mut self, ui: &mut egui::Ui) {
        let tab = self.grid.workspace().selected_tab();
        let subplot = self.grid.workspace().selected_subplot();
        let Ok(current) = self.grid.workspace().subplot(tab, subplot).cloned() else {
            return;
        };

        let mut groups: Vec<(String, Vec<SignalRef>)> = self
            .registry
            .loaded_sources()
            .into_iter()
            .map(|(i, s)| {
                let label = self.grid.index().label(SourceId::Index(i));
                let mut names: Vec<SignalRef> = s.signal_names().map(|n| SignalRef::new(i, n)).collect();
                names.sort();
                (label, names)
            })
            .collect();
        let mut derived: Vec<SignalRef> = self
            .registry
            .derived()
            .names()
            .into_iter()
            .map(SignalRef::derived)
            .collect();
        if !derived.is_empty() {
            derived.sort();
            groups.push(("derived".to_string(), derived));
        }

        let mut changed = false;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for (label, signals) in &groups {
                egui::CollapsingHeader::new(label)
                    .default_open(true)
                    .show(ui, |ui| {
                        for signal in signals {
                            let bound = current.signals().contains(signal);
                            let is_x = current.x_axis.signal() == Some(signal);
                            ui.horizontal(|ui| {
                                if ui.selectable_label(bound, &signal.name).clicked() {
                                    changed |= match current.mode() {
                                        SubplotMode::Regular if bound => self.grid.unassign(tab, subplot, signal),
                                        SubplotMode::Regular => self.grid.assign(tab, subplot, signal.clone()),
                                        SubplotMode::TupleXY => match current.x_axis.signal() {
                                            Some(x) => self.grid.add_tuple_pair(tab, subplot, x.clone(), signal.clone(), None),
                                            None => false,
                                        },
                                    };
                                }
                                if ui
                                    .small_button(if is_x { "x ✓" } else { "x" })
                                    .on_hover_text("Use as X axis")
                                    .clicked()
                                {
                                    let selection = if is_x {
                                        XAxisSelection::Time
                                    } else {
                                        XAxisSelection::Signal(signal.clone())
                                    };
                                    changed |= self.grid.set_x_axis(tab, subplot, selection);
                                }
                            });
                        }
                    });
            }
        });
        if changed {
            self.grid.refresh(&self.registry, Some(&[tab]));
        }
    }

    fn plot_area(&mut self, ui: &mut egui::Ui) {
        let ws = self.grid.workspace();
        let tab_index = ws.selected_tab();
        let selected = Some(ws.selected_subplot());
        let Ok(tab) = ws.tab(tab_index) else {
            return;
        };
        let style = PlotViewStyle {
            show_legend: self.grid.config().show_legend,
            marker_radius: self.grid.config().marker_radius,
        };
        let shape = tab.shape();
        let entry = self
            .trees
            .entry(tab.id())
            .or_insert_with(|| (shape, build_grid_tree(egui::Id::new(("grid", tab.id())), shape)));
        if entry.0 != shape {
            *entry = (shape, build_grid_tree(egui::Id::new(("grid", tab.id(), shape)), shape));
        }
        let frame = render_tile_grid(ui, &mut entry.1, tab, selected, style);

        if let Some(clicked) = frame.clicked {
            self.grid.select_subplot(clicked);
        }
        for (subplot, limits) in frame.view_changes {
            self.grid.pan_zoom_view(tab_index, subplot, limits);
        }
    }
}

impl eframe::App for PlotGridApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_sources();
        if let Some(stats) = self.grid.tick(&self.registry, Instant::now()) {
            tracing::debug!(?stats, "deferred tab refresh");
        }

        egui::TopBottomPanel::top("plotgrid_top").show(ctx, |ui| {
            self.tab_strip(ui);
            self.grid_controls(ui);
        });
        egui::SidePanel::left("plotgrid_signals")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Signals");
                self.signal_browser(ui);
            });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.plot_area(ui);
        });

        let poll = self.rx.as_ref().map(|_| self.grid.config().poll_interval());
        let due = self.grid.continuation_due_in(Instant::now());
        let wake = match (poll, due) {
            (Some(p), Some(d)) => Some(p.min(d)),
            (p, d) => p.or(d),
        };
        if let Some(wake) = wake {
            ctx.request_repaint_after(wake);
        }
    }
}

/// Install the default tracing subscriber unless the host already has one.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Launch the application in a native window. Blocks until the window is closed.
pub fn run_plotgrid(app: PlotGridApp, mut opts: eframe::NativeOptions) -> eframe::Result<()> {
    init_tracing();
    let title = app.grid.config().title.clone();
    if opts.viewport.inner_size.is_none() {
        opts.viewport = opts.viewport.clone().with_inner_size(egui::vec2(1400.0, 900.0));
    }
    info!(%title, "starting plot grid window");
    eframe::run_native(
        &title,
        opts,
        Box::new(|cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(app))
        }),
    )
}

/// Build an application around `registry` and launch it, optionally fed by a source channel.
pub fn run_with_config(config: PlotGridConfig, registry: InMemoryRegistry, rx: Option<Receiver<SourceCommand>>) -> eframe::Result<()> {
    let mut app = PlotGridApp::new(PlotGrid::new(config), registry);
    if let Some(rx) = rx {
        app = app.with_receiver(rx);
    }
    run_plotgrid(app, eframe::NativeOptions::default())
}
