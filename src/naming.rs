//! Display names for bound signals.
//!
//! The same signal name can come from several sources, or be bound in more
//! than one subplot. A bound signal keeps its bare name only while it is
//! unique everywhere; otherwise it gets a suffix:
//!
//! * `Temp_{1}`, `Temp_{2}`: the name comes from a single source and is just
//!   repeated across subplots. The counter runs per render pass.
//! * `Temp_{run_a}`, `Temp_{run_b}`: the name exists in several sources. The
//!   suffix is the source's canonical label, plus `_{n}` if that same source
//!   contributes the name more than once to the subplot.
//!
//! [`NameIndex`] answers "where does this name exist / where is it bound"
//! without scanning the workspace; [`NamingPass`] holds the counters of one
//! render pass and is dropped with it.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::data::signal::{SignalRef, SourceId};
use crate::data::source::{DataSource, DerivedSignals, SourceRegistry};
use crate::data::workspace::Workspace;

pub const DERIVED_LABEL: &str = "derived";

/// Reverse index: signal name -> sources that provide it, and -> cells that bind it.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    origins: HashMap<String, BTreeSet<SourceId>>,
    bindings: HashMap<String, HashMap<(usize, usize), usize>>,
    paths: BTreeMap<usize, PathBuf>,
    labels: HashMap<SourceId, String>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index (or re-index) every signal of a source.
    pub fn index_source(&mut self, index: usize, source: &DataSource) {
        self.drop_origin(SourceId::Index(index));
        for name in source.signal_names() {
            self.origins
                .entry(name.to_string())
                .or_default()
                .insert(SourceId::Index(index));
        }
        self.paths.insert(index, source.path().to_path_buf());
        self.relabel();
    }

    /// Forget a source that was unloaded.
    pub fn forget_source(&mut self, index: usize) {
        self.drop_origin(SourceId::Index(index));
        self.paths.remove(&index);
        self.relabel();
    }

    pub fn index_derived(&mut self, derived: &dyn DerivedSignals) {
        self.drop_origin(SourceId::Derived);
        for name in derived.names() {
            self.origins.entry(name).or_default().insert(SourceId::Derived);
        }
    }

    /// Rebuild the source half of the index from a registry.
    pub fn rebuild_sources(&mut self, registry: &dyn SourceRegistry) {
        self.origins.clear();
        self.paths.clear();
        for (i, source) in registry.loaded_sources() {
            for name in source.signal_names() {
                self.origins
                    .entry(name.to_string())
                    .or_default()
                    .insert(SourceId::Index(i));
            }
            self.paths.insert(i, source.path().to_path_buf());
        }
        self.index_derived(registry.derived());
        self.relabel();
    }

    fn drop_origin(&mut self, id: SourceId) {
        self.origins.retain(|_, set| {
            set.remove(&id);
            !set.is_empty()
        });
    }

    /// Canonical labels: file stem, prefixed with as many parent folders as
    /// it takes to tell sources apart. `derived` stays reserved for the
    /// sentinel; anything still ambiguous gets `#<index>`.
    fn relabel(&mut self) {
        let mut depth: BTreeMap<usize, usize> = self.paths.keys().map(|&i| (i, 0)).collect();
        let ambiguous = loop {
            let mut by_label: HashMap<String, Vec<usize>> = HashMap::new();
            for (&i, &d) in &depth {
                by_label.entry(label_at_depth(&self.paths[&i], d)).or_default().push(i);
            }
            let clashing: Vec<usize> = by_label
                .into_iter()
                .filter(|(label, members)| members.len() > 1 || label == DERIVED_LABEL)
                .flat_map(|(_, members)| members)
                .collect();
            let mut deepened = false;
            for &i in &clashing {
                let d = depth[&i];
                if d < ancestor_count(&self.paths[&i]) {
                    depth.insert(i, d + 1);
                    deepened = true;
                }
            }
            if !deepened {
                break clashing;
            }
        };

        self.labels.clear();
        self.labels.insert(SourceId::Derived, DERIVED_LABEL.to_string());
        for (&i, &d) in &depth {
            let mut label = label_at_depth(&self.paths[&i], d);
            if ambiguous.contains(&i) {
                label = format!("{label}#{i}");
            }
            self.labels.insert(SourceId::Index(i), label);
        }
    }

    pub fn label(&self, source: SourceId) -> String {
        self.labels.get(&source).cloned().unwrap_or_else(|| match source {
            SourceId::Derived => DERIVED_LABEL.to_string(),
            SourceId::Index(i) => format!("source{i}"),
        })
    }

    pub fn sources_of(&self, name: &str) -> Option<&BTreeSet<SourceId>> {
        self.origins.get(name)
    }

    /// Whether any loaded source or derived signal provides `name`.
    pub fn contains_name(&self, name: &str) -> bool {
        self.origins.contains_key(name)
    }

    pub fn bind(&mut self, name: &str, tab: usize, subplot: usize) {
        *self
            .bindings
            .entry(name.to_string())
            .or_default()
            .entry((tab, subplot))
            .or_insert(0) += 1;
    }

    pub fn unbind(&mut self, name: &str, tab: usize, subplot: usize) {
        if let Some(cells) = self.bindings.get_mut(name) {
            if let Some(count) = cells.get_mut(&(tab, subplot)) {
                *count -= 1;
                if *count == 0 {
                    cells.remove(&(tab, subplot));
                }
            }
            if cells.is_empty() {
                self.bindings.remove(name);
            }
        }
    }

    /// Rebuild the binding half of the index after structural changes
    /// (resize, tab close, mode toggle, snapshot restore).
    pub fn rebuild_bindings(&mut self, workspace: &Workspace) {
        self.bindings.clear();
        for (tab, subplot, name) in workspace.binding_locations() {
            self.bind(name, tab, subplot);
        }
    }

    /// Whether `name` is bound in any cell other than (`tab`, `subplot`).
    pub fn bound_elsewhere(&self, name: &str, tab: usize, subplot: usize) -> bool {
        self.bindings
            .get(name)
            .is_some_and(|cells| cells.keys().any(|&cell| cell != (tab, subplot)))
    }
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Names of the folders containing `path`, innermost first.
fn ancestors_of(path: &Path) -> impl Iterator<Item = String> + '_ {
    path.ancestors()
        .skip(1)
        .map_while(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned())
}

fn ancestor_count(path: &Path) -> usize {
    ancestors_of(path).count()
}

/// `a/logs/run` for `/a/logs/run.csv` at depth 2.
fn label_at_depth(path: &Path, depth: usize) -> String {
    let mut parts: Vec<String> = ancestors_of(path).take(depth).collect();
    parts.reverse();
    parts.push(stem_of(path));
    parts.join("/")
}

/// Counters used while naming signals during one render pass.
#[derive(Debug, Default)]
pub struct NamingPass {
    counters: HashMap<(String, String), usize>,
}

impl NamingPass {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self, name: &str, label: &str) -> usize {
        let n = self
            .counters
            .entry((name.to_string(), label.to_string()))
            .or_insert(0);
        *n += 1;
        *n
    }
}

/// Where a signal is being drawn: its cell plus the cell's other bindings.
#[derive(Debug, Clone, Copy)]
pub struct BindingSite<'a> {
    pub tab: usize,
    pub subplot: usize,
    pub siblings: &'a [SignalRef],
}

/// Display name of `target` drawn at `site`.
pub fn resolve_display_name(index: &NameIndex, pass: &mut NamingPass, site: BindingSite<'_>, target: &SignalRef) -> String {
    let base = target.name.as_str();
    let in_subplot: Vec<&SignalRef> = site.siblings.iter().filter(|r| r.name == base).collect();
    let origins = index.sources_of(base);

    let needs_suffix = in_subplot.len() > 1
        || index.bound_elsewhere(base, site.tab, site.subplot)
        || origins.is_some_and(|o| o.len() > 1);
    if !needs_suffix {
        return base.to_string();
    }

    let mut sources: BTreeSet<SourceId> = origins.into_iter().flatten().copied().collect();
    sources.extend(in_subplot.iter().map(|r| r.source));
    let own_label = index.label(target.source);

    if sources.len() <= 1 {
        let n = pass.next(base, &own_label);
        return format!("{base}_{{{n}}}");
    }

    let same_source = in_subplot.iter().filter(|r| r.source == target.source).count();
    if same_source > 1 {
        let n = pass.next(base, &own_label);
        format!("{base}_{{{own_label}}}_{{{n}}}")
    } else {
        format!("{base}_{{{own_label}}}")
    }
}
