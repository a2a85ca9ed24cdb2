//! Signal references: the identity of a bound signal and of tuple pairs.

use std::fmt;

use egui::Color32;
use serde::{Deserialize, Serialize};

/// Where a signal lives: a loaded source by index, or the derived-signal provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceId {
    Derived,
    Index(usize),
}

impl SourceId {
    pub fn index(self) -> Option<usize> {
        match self {
            SourceId::Derived => None,
            SourceId::Index(i) => Some(i),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Derived => write!(f, "derived"),
            SourceId::Index(i) => write!(f, "source {i}"),
        }
    }
}

/// A named signal within one source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignalRef {
    pub source: SourceId,
    pub name: String,
}

impl SignalRef {
    pub fn new(source: usize, name: impl Into<String>) -> Self {
        Self {
            source: SourceId::Index(source),
            name: name.into(),
        }
    }

    pub fn derived(name: impl Into<String>) -> Self {
        Self {
            source: SourceId::Derived,
            name: name.into(),
        }
    }
}

impl fmt::Display for SignalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({})", self.name, self.source)
    }
}

/// What a Regular-mode subplot plots its signals against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum XAxisSelection {
    #[default]
    Time,
    Signal(SignalRef),
}

impl XAxisSelection {
    pub fn signal(&self) -> Option<&SignalRef> {
        match self {
            XAxisSelection::Time => None,
            XAxisSelection::Signal(r) => Some(r),
        }
    }
}

/// An explicit X-signal / Y-signal combination drawn against each other.
#[derive(Debug, Clone, PartialEq)]
pub struct TuplePair {
    pub x: SignalRef,
    pub y: SignalRef,
    pub label: String,
    pub color: Color32,
}

impl TuplePair {
    pub fn default_label(x: &SignalRef, y: &SignalRef) -> String {
        format!("{} vs {}", y.name, x.name)
    }
}
