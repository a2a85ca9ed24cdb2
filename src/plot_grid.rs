//! [`PlotGrid`]: the public entry point tying the model, the reverse name
//! index, the layout manager, axis linking and the render pipeline together.
//!
//! Every editing operation validates its indices and, on failure, logs a
//! warning and leaves the state untouched instead of returning an error. The
//! return value only says whether anything changed.

use std::time::{Duration, Instant};

use egui::Color32;
use tracing::{debug, info, warn};

use crate::config::PlotGridConfig;
use crate::data::signal::{SignalRef, TuplePair, XAxisSelection};
use crate::data::source::{DataSource, SourceRegistry};
use crate::data::subplot::SubplotMode;
use crate::data::tab::GridShape;
use crate::data::workspace::Workspace;
use crate::deferred::DeferredSlot;
use crate::error::Result;
use crate::layout;
use crate::linking;
use crate::naming::NameIndex;
use crate::render::surface::PlotLimits;
use crate::render::{RefreshStats, RenderContext, RenderPipeline};
use crate::style::{alloc_color, SignalStyles};

/// Follow-up work scheduled through the deferred slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Refresh the tab with this id after it became the selected tab.
    RefreshTab(u64),
}

/// Log a rejected request and turn it into `None`.
fn degrade<T>(operation: &'static str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(operation, %err, "request ignored");
            None
        }
    }
}

#[derive(Debug)]
pub struct PlotGrid {
    workspace: Workspace,
    index: NameIndex,
    styles: SignalStyles,
    pipeline: RenderPipeline,
    config: PlotGridConfig,
    palette: Vec<Color32>,
    deferred: DeferredSlot<Continuation>,
}

impl Default for PlotGrid {
    fn default() -> Self {
        Self::new(PlotGridConfig::default())
    }
}

impl PlotGrid {
    pub fn new(config: PlotGridConfig) -> Self {
        let shape = GridShape::new(config.default_rows, config.default_cols).unwrap_or_else(|err| {
            warn!(%err, "configured default grid rejected, using 1x1");
            GridShape::single()
        });
        Self {
            workspace: Workspace::new(shape),
            index: NameIndex::new(),
            styles: SignalStyles::default(),
            pipeline: RenderPipeline::new(&config),
            palette: config.palette_colors(),
            config,
            deferred: DeferredSlot::new(),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn index(&self) -> &NameIndex {
        &self.index
    }

    pub fn styles(&self) -> &SignalStyles {
        &self.styles
    }

    pub fn config(&self) -> &PlotGridConfig {
        &self.config
    }

    /// Time left until the pending tab-switch refresh runs, if one is scheduled.
    pub fn continuation_due_in(&self, now: Instant) -> Option<Duration> {
        self.deferred.time_until_due(now)
    }

    // ---------- sources ----------

    /// Re-index every loaded source and derived signal.
    pub fn sources_changed(&mut self, registry: &dyn SourceRegistry) {
        self.index.rebuild_sources(registry);
    }

    pub fn source_loaded(&mut self, index: usize, source: &DataSource) {
        self.index.index_source(index, source);
        info!(index, path = %source.path().display(), "source indexed");
    }

    /// Bindings to an unloaded source are kept and skipped at render time.
    pub fn source_removed(&mut self, index: usize) {
        self.index.forget_source(index);
    }

    // ---------- tabs ----------

    pub fn add_tab(&mut self) -> usize {
        let shape = self
            .workspace
            .tab(self.workspace.selected_tab())
            .map(|t| t.shape())
            .unwrap_or_default();
        let index = self.workspace.add_tab(shape);
        debug!(index, "tab added");
        index
    }

    pub fn close_tab(&mut self, tab: usize) -> bool {
        let closed = degrade("close_tab", self.workspace.close_tab(tab)).is_some();
        if closed {
            self.index.rebuild_bindings(&self.workspace);
        }
        closed
    }

    /// Switch tabs immediately and schedule the new tab's refresh, replacing
    /// any refresh still pending from an earlier switch.
    pub fn select_tab(&mut self, tab: usize, now: Instant) -> bool {
        if degrade("select_tab", self.workspace.select_tab(tab)).is_none() {
            return false;
        }
        if let Ok(t) = self.workspace.tab(tab) {
            let replaced = self
                .deferred
                .schedule(Continuation::RefreshTab(t.id()), now, self.config.deferred_delay());
            if let Some(old) = replaced {
                debug!(?old, "pending continuation replaced");
            }
        }
        true
    }

    pub fn select_subplot(&mut self, subplot: usize) -> bool {
        degrade("select_subplot", self.workspace.select_subplot(subplot)).is_some()
    }

    pub fn set_tab_title(&mut self, tab: usize, title: impl Into<String>) -> bool {
        degrade("set_tab_title", self.workspace.set_tab_title(tab, title)).is_some()
    }

    /// Reshape a tab's grid, transplanting bindings onto the new cells.
    pub fn resize(&mut self, tab: usize, rows: usize, cols: usize) -> bool {
        let result = self
            .workspace
            .tab_mut(tab)
            .and_then(|t| layout::resize(t, rows, cols));
        let changed = degrade("resize", result).unwrap_or(false);
        if changed {
            if let Ok(t) = self.workspace.tab_mut(tab) {
                linking::regroup(t);
            }
            self.workspace.clamp_selected_subplot();
            self.index.rebuild_bindings(&self.workspace);
        }
        changed
    }

    pub fn set_linking(&mut self, tab: usize, enabled: bool) -> bool {
        let Some(t) = degrade("set_linking", self.workspace.tab_mut(tab)) else {
            return false;
        };
        linking::set_linking(t, enabled);
        true
    }

    /// Interactive X pan/zoom on one subplot, propagated to its link group.
    pub fn pan_zoom(&mut self, tab: usize, subplot: usize, x: (f64, f64)) -> Vec<usize> {
        let result = self
            .workspace
            .tab_mut(tab)
            .and_then(|t| linking::pan_zoom(t, subplot, x));
        degrade("pan_zoom", result).unwrap_or_default()
    }

    /// Like [`pan_zoom`](Self::pan_zoom), but the interacting subplot also keeps its Y range.
    pub fn pan_zoom_view(&mut self, tab: usize, subplot: usize, limits: PlotLimits) -> Vec<usize> {
        let changed = self.pan_zoom(tab, subplot, limits.x);
        if let Some(surface) = self
            .workspace
            .tab_mut(tab)
            .ok()
            .and_then(|t| t.surfaces_mut().get_mut(subplot))
        {
            surface.set_manual_limits(limits);
        }
        changed
    }

    // ---------- bindings ----------

    pub fn assign(&mut self, tab: usize, subplot: usize, signal: SignalRef) -> bool {
        let name = signal.name.clone();
        let ok = degrade("assign", self.workspace.assign(tab, subplot, signal)).is_some();
        if ok {
            self.index.bind(&name, tab, subplot);
        }
        ok
    }

    pub fn unassign(&mut self, tab: usize, subplot: usize, signal: &SignalRef) -> bool {
        let removed = degrade("unassign", self.workspace.unassign(tab, subplot, signal)).unwrap_or(false);
        if removed {
            self.index.unbind(&signal.name, tab, subplot);
        }
        removed
    }

    pub fn set_x_axis(&mut self, tab: usize, subplot: usize, x_axis: XAxisSelection) -> bool {
        if degrade("set_x_axis", self.workspace.set_x_axis(tab, subplot, x_axis)).is_none() {
            return false;
        }
        if let Ok(t) = self.workspace.tab_mut(tab) {
            linking::regroup(t);
        }
        true
    }

    /// Flip a subplot between Regular and TupleXY, discarding the old mode's bindings.
    pub fn toggle_tuple_mode(&mut self, tab: usize, subplot: usize) -> Option<SubplotMode> {
        let mode = degrade("toggle_tuple_mode", self.workspace.toggle_tuple_mode(tab, subplot))?;
        if let Ok(t) = self.workspace.tab_mut(tab) {
            linking::regroup(t);
        }
        self.index.rebuild_bindings(&self.workspace);
        Some(mode)
    }

    /// Add an X/Y pair to a TupleXY subplot. The label defaults to `"<y> vs <x>"`
    /// and the color to the palette entry for the pair's position.
    pub fn add_tuple_pair(&mut self, tab: usize, subplot: usize, x: SignalRef, y: SignalRef, label: Option<String>) -> bool {
        let position = self
            .workspace
            .subplot(tab, subplot)
            .map(|s| s.pairs().len())
            .unwrap_or(0);
        let pair = TuplePair {
            label: label.unwrap_or_else(|| TuplePair::default_label(&x, &y)),
            color: alloc_color(&self.palette, position),
            x,
            y,
        };
        let (x_name, y_name) = (pair.x.name.clone(), pair.y.name.clone());
        let ok = degrade("add_tuple_pair", self.workspace.add_tuple_pair(tab, subplot, pair)).is_some();
        if ok {
            self.index.bind(&x_name, tab, subplot);
            self.index.bind(&y_name, tab, subplot);
        }
        ok
    }

    pub fn remove_tuple_pair(&mut self, tab: usize, subplot: usize, pair: usize) -> bool {
        match degrade("remove_tuple_pair", self.workspace.remove_tuple_pair(tab, subplot, pair)) {
            Some(removed) => {
                self.index.unbind(&removed.x.name, tab, subplot);
                self.index.unbind(&removed.y.name, tab, subplot);
                true
            }
            None => false,
        }
    }

    pub fn clear_subplot(&mut self, tab: usize, subplot: usize) -> bool {
        let ok = degrade("clear_subplot", self.workspace.clear_subplot(tab, subplot)).is_some();
        if ok {
            self.index.rebuild_bindings(&self.workspace);
        }
        ok
    }

    pub fn set_custom_y_label(&mut self, tab: usize, subplot: usize, label: Option<String>) -> bool {
        degrade("set_custom_y_label", self.workspace.set_custom_y_label(tab, subplot, label)).is_some()
    }

    // ---------- styles ----------

    pub fn set_signal_color(&mut self, signal: SignalRef, color: Color32) {
        self.styles.set_color(signal, color);
    }

    pub fn set_signal_width(&mut self, signal: SignalRef, width: f32) {
        self.styles.set_width(signal, width);
    }

    pub fn clear_signal_style(&mut self, signal: &SignalRef) -> bool {
        self.styles.clear(signal)
    }

    // ---------- rendering ----------

    /// Redraw `tabs` (every tab when `None`).
    pub fn refresh(&mut self, registry: &dyn SourceRegistry, tabs: Option<&[usize]>) -> RefreshStats {
        let ctx = RenderContext {
            registry,
            index: &self.index,
            styles: &self.styles,
        };
        self.pipeline.refresh(&mut self.workspace, ctx, tabs)
    }

    /// Run the deferred continuation if it is due.
    pub fn tick(&mut self, registry: &dyn SourceRegistry, now: Instant) -> Option<RefreshStats> {
        let Continuation::RefreshTab(id) = self.deferred.take_due(now)?;
        let Some(tab) = self.workspace.tabs().iter().position(|t| t.id() == id) else {
            debug!(id, "deferred refresh dropped: tab closed");
            return None;
        };
        Some(self.refresh(registry, Some(&[tab])))
    }

    /// Swap in a restored workspace and styles, rebuilding the derived state.
    pub(crate) fn install(&mut self, workspace: Workspace, styles: SignalStyles, registry: &dyn SourceRegistry) {
        self.workspace = workspace;
        self.styles = styles;
        self.deferred.cancel();
        self.index.rebuild_sources(registry);
        self.index.rebuild_bindings(&self.workspace);
        for tab in self.workspace.tabs_mut() {
            linking::regroup(tab);
        }
    }
}
