//! Loaded tabular sources and the registry the core reads them through.
//!
//! Parsing files into a [`DataSource`] happens elsewhere; this module only
//! holds already-resident columns plus the per-signal scaling factors and
//! state-signal flags. [`InMemoryRegistry`] is the stock implementation of
//! [`SourceRegistry`] used by the application and the tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A time column plus named numeric signal columns.
#[derive(Debug, Clone, Default)]
pub struct DataSource {
    path: PathBuf,
    time: Vec<f64>,
    columns: Vec<(String, Vec<f64>)>,
    column_index: HashMap<String, usize>,
    scaling: HashMap<String, f64>,
    state_flags: HashMap<String, bool>,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>, time: Vec<f64>) -> Self {
        Self {
            path: path.into(),
            time,
            ..Default::default()
        }
    }

    /// Builder-style [`insert_signal`](Self::insert_signal).
    pub fn with_signal(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.insert_signal(name, values);
        self
    }

    /// Add or replace a signal column.
    pub fn insert_signal(&mut self, name: impl Into<String>, values: Vec<f64>) {
        let name = name.into();
        if let Some(&idx) = self.column_index.get(&name) {
            self.columns[idx].1 = values;
        } else {
            self.column_index.insert(name.clone(), self.columns.len());
            self.columns.push((name, values));
        }
    }

    /// Append one streamed row. Columns missing from `values` receive NaN so
    /// every column stays aligned with the time column. A column named twice
    /// in the same row keeps the last value.
    pub fn append_row<'a>(&mut self, t: f64, values: impl IntoIterator<Item = (&'a str, f64)>) {
        let row = self.time.len();
        self.time.push(t);
        for (_, col) in self.columns.iter_mut() {
            col.resize(row + 1, f64::NAN);
        }
        for (name, v) in values {
            let idx = match self.column_index.get(name) {
                Some(&idx) => idx,
                None => {
                    self.insert_signal(name, vec![f64::NAN; row + 1]);
                    self.columns.len() - 1
                }
            };
            self.columns[idx].1[row] = v;
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn signal(&self, name: &str) -> Option<&[f64]> {
        self.column_index
            .get(name)
            .map(|&idx| self.columns[idx].1.as_slice())
    }

    pub fn has_signal(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    pub fn signal_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Declared multiplier for a signal, 1.0 when none was set.
    pub fn scale_for(&self, name: &str) -> f64 {
        self.scaling.get(name).copied().unwrap_or(1.0)
    }

    pub fn set_scale(&mut self, name: impl Into<String>, factor: f64) {
        self.scaling.insert(name.into(), factor);
    }

    pub fn scaling(&self) -> &HashMap<String, f64> {
        &self.scaling
    }

    pub fn is_state(&self, name: &str) -> bool {
        self.state_flags.get(name).copied().unwrap_or(false)
    }

    pub fn set_state(&mut self, name: impl Into<String>, is_state: bool) {
        self.state_flags.insert(name.into(), is_state);
    }

    pub fn state_flags(&self) -> &HashMap<String, bool> {
        &self.state_flags
    }
}

/// Signals computed from others, addressed through [`SourceId::Derived`](crate::SourceId::Derived).
pub trait DerivedSignals {
    /// `(time, values)` for a derived signal, computed on demand.
    fn series(&self, name: &str) -> Option<(Vec<f64>, Vec<f64>)>;
    fn names(&self) -> Vec<String>;
}

/// Read access to the loaded sources, consumed by the render pipeline.
pub trait SourceRegistry {
    /// Number of source slots. Removed sources leave an empty slot so that
    /// indices held by bindings never shift onto a different source.
    fn slot_count(&self) -> usize;
    fn source(&self, index: usize) -> Option<&DataSource>;
    fn derived(&self) -> &dyn DerivedSignals;
    fn is_streaming(&self) -> bool;

    fn loaded_sources(&self) -> Vec<(usize, &DataSource)> {
        (0..self.slot_count())
            .filter_map(|i| self.source(i).map(|s| (i, s)))
            .collect()
    }
}

/// Derived signals stored as precomputed series.
#[derive(Debug, Clone, Default)]
pub struct DerivedStore {
    series: HashMap<String, (Vec<f64>, Vec<f64>)>,
}

impl DerivedStore {
    pub fn insert(&mut self, name: impl Into<String>, time: Vec<f64>, values: Vec<f64>) {
        self.series.insert(name.into(), (time, values));
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.series.remove(name).is_some()
    }
}

impl DerivedSignals for DerivedStore {
    fn series(&self, name: &str) -> Option<(Vec<f64>, Vec<f64>)> {
        self.series.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.series.keys().cloned().collect();
        names.sort();
        names
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    sources: Vec<Option<DataSource>>,
    pub derived: DerivedStore,
    streaming: bool,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source and return its index.
    pub fn add_source(&mut self, source: DataSource) -> usize {
        self.sources.push(Some(source));
        self.sources.len() - 1
    }

    /// Unload a source. Bindings that still point at it are skipped at render time.
    pub fn remove_source(&mut self, index: usize) -> Option<DataSource> {
        self.sources.get_mut(index).and_then(Option::take)
    }

    /// Reload a source into an existing slot so bindings keep pointing at it.
    pub fn replace_source(&mut self, index: usize, source: DataSource) -> bool {
        match self.sources.get_mut(index) {
            Some(slot) => {
                *slot = Some(source);
                true
            }
            None => false,
        }
    }

    /// Index of the loaded source read from `path`.
    pub fn find_by_path(&self, path: &Path) -> Option<usize> {
        self.sources
            .iter()
            .position(|s| s.as_ref().is_some_and(|s| s.path() == path))
    }

    pub fn source_mut(&mut self, index: usize) -> Option<&mut DataSource> {
        self.sources.get_mut(index).and_then(Option::as_mut)
    }

    pub fn set_streaming(&mut self, streaming: bool) {
        self.streaming = streaming;
    }
}

impl SourceRegistry for InMemoryRegistry {
    fn slot_count(&self) -> usize {
        self.sources.len()
    }

    fn source(&self, index: usize) -> Option<&DataSource> {
        self.sources.get(index).and_then(Option::as_ref)
    }

    fn derived(&self) -> &dyn DerivedSignals {
        &self.derived
    }

    fn is_streaming(&self) -> bool {
        self.streaming
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_row_keeps_columns_aligned() {
        let mut src = DataSource::new("a.csv", vec![0.0]).with_signal("A", vec![1.0]);
        src.append_row(1.0, [("B", 5.0)]);
        assert_eq!(src.time().len(), 2);
        let a = src.signal("A").unwrap();
        assert_eq!(a.len(), 2);
        assert!(a[1].is_nan());
        assert_eq!(src.signal("B").unwrap().len(), 2);
        assert!(src.signal("B").unwrap()[0].is_nan());
    }

    #[test]
    fn repeated_column_in_a_row_keeps_last_value() {
        let mut src = DataSource::new("a.csv", vec![0.0]).with_signal("A", vec![10.0]);
        src.append_row(1.0, [("A", 11.0), ("A", 99.0)]);
        src.append_row(2.0, [("A", 12.0)]);
        assert_eq!(src.time(), &[0.0, 1.0, 2.0]);
        assert_eq!(src.signal("A").unwrap(), &[10.0, 99.0, 12.0]);
    }

    #[test]
    fn removed_source_keeps_slot() {
        let mut reg = InMemoryRegistry::new();
        reg.add_source(DataSource::new("a.csv", vec![]));
        let b = reg.add_source(DataSource::new("b.csv", vec![]));
        reg.remove_source(0);
        assert!(reg.source(0).is_none());
        assert_eq!(reg.source(b).unwrap().path(), Path::new("b.csv"));
        assert_eq!(reg.loaded_sources().len(), 1);
    }
}
