//! Channel for feeding sources into a running [`PlotGridApp`](crate::ui::PlotGridApp).
//!
//! Producers hold a [`SourceSink`] and address sources by file path; the UI
//! thread drains the receiving end once per frame with [`apply_command`].

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, SendError, Sender};

use tracing::warn;

use crate::data::source::{DataSource, InMemoryRegistry};

/// Messages sent over the channel to update the source registry.
#[derive(Debug, Clone)]
pub enum SourceCommand {
    /// Register a fully loaded source.
    Load(DataSource),
    /// Unload the source with this path. Bindings to it stay in place.
    Unload { path: PathBuf },
    /// Append one row to a streaming source.
    AppendRow {
        path: PathBuf,
        t: f64,
        values: Vec<(String, f64)>,
    },
    /// Add or replace a derived signal.
    SetDerived {
        name: String,
        time: Vec<f64>,
        values: Vec<f64>,
    },
    /// Switch between the streaming and static render policies.
    SetStreaming(bool),
}

/// What applying a command changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEffect {
    /// The set of loaded signal names may have changed; re-index.
    SourcesChanged,
    /// Only sample data changed.
    DataChanged,
    Ignored,
}

/// Convenience sender for feeding sources into the application.
#[derive(Clone)]
pub struct SourceSink {
    tx: Sender<SourceCommand>,
}

impl SourceSink {
    pub fn load(&self, source: DataSource) -> Result<(), SendError<SourceCommand>> {
        self.tx.send(SourceCommand::Load(source))
    }

    pub fn unload(&self, path: impl Into<PathBuf>) -> Result<(), SendError<SourceCommand>> {
        self.tx.send(SourceCommand::Unload { path: path.into() })
    }

    pub fn append_row<I, S>(&self, path: impl Into<PathBuf>, t: f64, values: I) -> Result<(), SendError<SourceCommand>>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.tx.send(SourceCommand::AppendRow {
            path: path.into(),
            t,
            values: values.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        })
    }

    pub fn set_derived(&self, name: impl Into<String>, time: Vec<f64>, values: Vec<f64>) -> Result<(), SendError<SourceCommand>> {
        self.tx.send(SourceCommand::SetDerived {
            name: name.into(),
            time,
            values,
        })
    }

    pub fn set_streaming(&self, streaming: bool) -> Result<(), SendError<SourceCommand>> {
        self.tx.send(SourceCommand::SetStreaming(streaming))
    }
}

/// Create a new channel pair for feeding sources.
pub fn channel() -> (SourceSink, Receiver<SourceCommand>) {
    let (tx, rx) = std::sync::mpsc::channel();
    (SourceSink { tx }, rx)
}

/// Apply one command to the registry.
pub fn apply_command(registry: &mut InMemoryRegistry, command: SourceCommand) -> SinkEffect {
    match command {
        SourceCommand::Load(source) => {
            match registry.find_by_path(source.path()) {
                Some(existing) => {
                    registry.replace_source(existing, source);
                }
                None => {
                    registry.add_source(source);
                }
            }
            SinkEffect::SourcesChanged
        }
        SourceCommand::Unload { path } => match registry.find_by_path(&path) {
            Some(index) => {
                registry.remove_source(index);
                SinkEffect::SourcesChanged
            }
            None => {
                warn!(path = %path.display(), "unload: no such source");
                SinkEffect::Ignored
            }
        },
        SourceCommand::AppendRow { path, t, values } => {
            let Some(source) = registry.find_by_path(&path).and_then(|i| registry.source_mut(i)) else {
                warn!(path = %path.display(), "append: no such source");
                return SinkEffect::Ignored;
            };
            let new_column = values.iter().any(|(name, _)| !source.has_signal(name));
            source.append_row(t, values.iter().map(|(n, v)| (n.as_str(), *v)));
            if new_column {
                SinkEffect::SourcesChanged
            } else {
                SinkEffect::DataChanged
            }
        }
        SourceCommand::SetDerived { name, time, values } => {
            registry.derived.insert(name, time, values);
            SinkEffect::SourcesChanged
        }
        SourceCommand::SetStreaming(streaming) => {
            registry.set_streaming(streaming);
            SinkEffect::DataChanged
        }
    }
}
