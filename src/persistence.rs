//! Workspace persistence: save and restore tabs, bindings and styles as JSON.
//!
//! The snapshot uses serializable mirror types for state that cannot derive
//! serde traits directly (e.g. `Color32`, `XAxisSelection`). Every field has
//! a default so older files load after fields are added.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use egui::Color32;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::signal::{SignalRef, TuplePair, XAxisSelection};
use crate::data::source::{DataSource, InMemoryRegistry, SourceRegistry};
use crate::data::subplot::{Subplot, SubplotContent, SubplotMode};
use crate::data::tab::{GridShape, Tab, MAX_GRID_DIM};
use crate::data::workspace::Workspace;
use crate::error::{PlotGridError, Result};
use crate::naming::NameIndex;
use crate::plot_grid::PlotGrid;
use crate::style::{SignalStyle, SignalStyles};

pub const SNAPSHOT_VERSION: u32 = 1;

fn to_rgba(c: Color32) -> [u8; 4] {
    [c.r(), c.g(), c.b(), c.a()]
}

fn from_rgba(c: [u8; 4]) -> Color32 {
    Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}

// ---------- Serializable mirror types ----------

/// Serializable version of a [`TuplePair`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuplePairSnapshot {
    pub x: SignalRef,
    pub y: SignalRef,
    pub label: String,
    pub color_rgba: [u8; 4],
}

impl From<&TuplePair> for TuplePairSnapshot {
    fn from(p: &TuplePair) -> Self {
        Self {
            x: p.x.clone(),
            y: p.y.clone(),
            label: p.label.clone(),
            color_rgba: to_rgba(p.color),
        }
    }
}

impl TuplePairSnapshot {
    pub fn into_pair(self) -> TuplePair {
        TuplePair {
            x: self.x,
            y: self.y,
            label: self.label,
            color: from_rgba(self.color_rgba),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubplotSnapshot {
    pub tuple_mode: bool,
    pub signals: Vec<SignalRef>,
    /// `None` plots against time.
    pub x_axis: Option<SignalRef>,
    pub custom_y_label: Option<String>,
    pub tuple_pairs: Vec<TuplePairSnapshot>,
}

impl From<&Subplot> for SubplotSnapshot {
    fn from(s: &Subplot) -> Self {
        Self {
            tuple_mode: s.mode() == SubplotMode::TupleXY,
            signals: s.signals().to_vec(),
            x_axis: s.x_axis.signal().cloned(),
            custom_y_label: s.custom_y_label.clone(),
            tuple_pairs: s.pairs().iter().map(TuplePairSnapshot::from).collect(),
        }
    }
}

impl SubplotSnapshot {
    /// Rebuild a subplot, keeping only references whose name `known` accepts.
    /// Returns the subplot and the number of references dropped.
    fn into_subplot(self, known: impl Fn(&str) -> bool) -> (Subplot, usize) {
        let mut dropped = 0;
        let content = if self.tuple_mode {
            let total = self.tuple_pairs.len();
            let pairs: Vec<TuplePair> = self
                .tuple_pairs
                .into_iter()
                .filter(|p| known(&p.x.name) && known(&p.y.name))
                .map(TuplePairSnapshot::into_pair)
                .collect();
            dropped += total - pairs.len();
            SubplotContent::TupleXY(pairs)
        } else {
            let mut signals: Vec<SignalRef> = Vec::with_capacity(self.signals.len());
            for signal in self.signals {
                if known(&signal.name) && !signals.contains(&signal) {
                    signals.push(signal);
                } else {
                    dropped += 1;
                }
            }
            SubplotContent::Regular(signals)
        };
        let x_axis = match self.x_axis {
            Some(x) if known(&x.name) => XAxisSelection::Signal(x),
            Some(_) => {
                dropped += 1;
                XAxisSelection::Time
            }
            None => XAxisSelection::Time,
        };
        let subplot = Subplot {
            content,
            x_axis,
            custom_y_label: self.custom_y_label.filter(|l| !l.is_empty()),
        };
        (subplot, dropped)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabSnapshot {
    pub title: String,
    pub rows: usize,
    pub cols: usize,
    pub linking: bool,
    /// Row-major, `rows * cols` entries when written by this crate.
    pub subplots: Vec<SubplotSnapshot>,
}

impl Default for TabSnapshot {
    fn default() -> Self {
        Self {
            title: String::new(),
            rows: 1,
            cols: 1,
            linking: false,
            subplots: Vec::new(),
        }
    }
}

impl From<&Tab> for TabSnapshot {
    fn from(t: &Tab) -> Self {
        Self {
            title: t.title.clone(),
            rows: t.shape().rows(),
            cols: t.shape().cols(),
            linking: t.linking_enabled(),
            subplots: t.subplots().iter().map(SubplotSnapshot::from).collect(),
        }
    }
}

/// Per-source scaling factors and state flags, matched back by file path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceStyleSnapshot {
    pub path: PathBuf,
    pub scaling: BTreeMap<String, f64>,
    pub state_signals: Vec<String>,
}

impl From<&DataSource> for SourceStyleSnapshot {
    fn from(s: &DataSource) -> Self {
        let mut state_signals: Vec<String> = s
            .state_flags()
            .iter()
            .filter(|(_, on)| **on)
            .map(|(name, _)| name.clone())
            .collect();
        state_signals.sort();
        Self {
            path: s.path().to_path_buf(),
            scaling: s
                .scaling()
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            state_signals,
        }
    }
}

impl SourceStyleSnapshot {
    pub fn apply_to(&self, source: &mut DataSource) {
        for (name, factor) in &self.scaling {
            source.set_scale(name.clone(), *factor);
        }
        for name in &self.state_signals {
            source.set_state(name.clone(), true);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalStyleSnapshot {
    pub signal: SignalRef,
    #[serde(default)]
    pub color_rgba: Option<[u8; 4]>,
    #[serde(default)]
    pub width: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceSnapshot {
    pub version: u32,
    /// RFC 3339 timestamp of the save.
    pub saved_at: Option<String>,
    pub selected_tab: usize,
    pub tabs: Vec<TabSnapshot>,
    pub sources: Vec<SourceStyleSnapshot>,
    pub signal_styles: Vec<SignalStyleSnapshot>,
}

impl Default for WorkspaceSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: None,
            selected_tab: 0,
            tabs: Vec::new(),
            sources: Vec::new(),
            signal_styles: Vec::new(),
        }
    }
}

/// Outcome of [`restore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub tabs: usize,
    /// References dropped because no loaded source provides their name.
    pub dropped: usize,
}

// ---------- Capture / restore ----------

pub fn capture(grid: &PlotGrid, registry: &dyn SourceRegistry) -> WorkspaceSnapshot {
    let workspace = grid.workspace();
    let mut signal_styles: Vec<SignalStyleSnapshot> = grid
        .styles()
        .iter()
        .map(|(signal, style)| SignalStyleSnapshot {
            signal: signal.clone(),
            color_rgba: style.color.map(to_rgba),
            width: style.width,
        })
        .collect();
    signal_styles.sort_by(|a, b| a.signal.cmp(&b.signal));

    WorkspaceSnapshot {
        version: SNAPSHOT_VERSION,
        saved_at: Some(chrono::Local::now().to_rfc3339()),
        selected_tab: workspace.selected_tab(),
        tabs: workspace.tabs().iter().map(TabSnapshot::from).collect(),
        sources: registry
            .loaded_sources()
            .into_iter()
            .map(|(_, s)| SourceStyleSnapshot::from(s))
            .collect(),
        signal_styles,
    }
}

/// Apply saved scaling and state flags to loaded sources with a matching path.
/// Returns how many sources were updated.
pub fn apply_source_styles(snapshot: &WorkspaceSnapshot, registry: &mut InMemoryRegistry) -> usize {
    let mut applied = 0;
    for slot in 0..registry.slot_count() {
        let Some(source) = registry.source_mut(slot) else {
            continue;
        };
        if let Some(saved) = snapshot.sources.iter().find(|s| s.path == source.path()) {
            saved.apply_to(source);
            applied += 1;
        }
    }
    applied
}

fn clamp_dim(n: usize) -> usize {
    n.clamp(1, MAX_GRID_DIM)
}

/// Replace the grid's workspace and styles with the snapshot's contents.
///
/// Bindings, X-axis selections and tuple pairs naming a signal that no loaded
/// source (or derived signal) provides are dropped. Grid shapes are clamped
/// into range and subplot lists padded or truncated to fit.
pub fn restore(grid: &mut PlotGrid, snapshot: WorkspaceSnapshot, registry: &dyn SourceRegistry) -> RestoreReport {
    let mut known = NameIndex::new();
    known.rebuild_sources(registry);

    let mut report = RestoreReport::default();
    let mut tabs = Vec::with_capacity(snapshot.tabs.len());
    for (i, saved) in snapshot.tabs.into_iter().enumerate() {
        let shape = GridShape::new(clamp_dim(saved.rows), clamp_dim(saved.cols)).unwrap_or_default();
        let id = i as u64 + 1;
        let title = if saved.title.is_empty() {
            format!("Tab {id}")
        } else {
            saved.title
        };
        let mut subplots: Vec<Subplot> = saved
            .subplots
            .into_iter()
            .take(shape.cell_count())
            .map(|s| {
                let (subplot, dropped) = s.into_subplot(|name| known.contains_name(name));
                report.dropped += dropped;
                subplot
            })
            .collect();
        subplots.resize(shape.cell_count(), Subplot::default());

        let mut tab = Tab::new(id, title, shape);
        tab.replace_grid(shape, subplots);
        tab.set_linking_flag(saved.linking);
        tabs.push(tab);
    }
    report.tabs = tabs.len();

    let mut styles = SignalStyles::default();
    for saved in snapshot.signal_styles {
        styles.insert(
            saved.signal,
            SignalStyle {
                color: saved.color_rgba.map(from_rgba),
                width: saved.width,
            },
        );
    }

    let mut workspace = Workspace::default();
    workspace.replace_tabs(tabs, snapshot.selected_tab);
    grid.install(workspace, styles, registry);
    info!(tabs = report.tabs, dropped = report.dropped, "workspace restored");
    report
}

// ---------- JSON I/O ----------

pub fn snapshot_to_json(snapshot: &WorkspaceSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Parse a snapshot, rejecting versions newer than this build understands.
pub fn snapshot_from_json(json: &str) -> Result<WorkspaceSnapshot> {
    let snapshot: WorkspaceSnapshot = serde_json::from_str(json)?;
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(PlotGridError::UnsupportedVersion {
            found: snapshot.version,
            supported: SNAPSHOT_VERSION,
        });
    }
    Ok(snapshot)
}

pub fn save_snapshot(snapshot: &WorkspaceSnapshot, path: &Path) -> Result<()> {
    std::fs::write(path, snapshot_to_json(snapshot)?)?;
    debug!(path = %path.display(), "snapshot saved");
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<WorkspaceSnapshot> {
    snapshot_from_json(&std::fs::read_to_string(path)?)
}
