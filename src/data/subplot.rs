//! One grid cell's bindings.

use crate::data::signal::{SignalRef, TuplePair, XAxisSelection};
use crate::error::{PlotGridError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubplotMode {
    Regular,
    TupleXY,
}

impl SubplotMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SubplotMode::Regular => "Regular",
            SubplotMode::TupleXY => "TupleXY",
        }
    }
}

/// Mode-specific rendering data. Each mode owns its own list, so switching
/// modes discards the other one.
#[derive(Debug, Clone, PartialEq)]
pub enum SubplotContent {
    Regular(Vec<SignalRef>),
    TupleXY(Vec<TuplePair>),
}

impl Default for SubplotContent {
    fn default() -> Self {
        SubplotContent::Regular(Vec::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subplot {
    pub content: SubplotContent,
    /// Ignored while in TupleXY mode.
    pub x_axis: XAxisSelection,
    pub custom_y_label: Option<String>,
}

impl Subplot {
    pub fn mode(&self) -> SubplotMode {
        match self.content {
            SubplotContent::Regular(_) => SubplotMode::Regular,
            SubplotContent::TupleXY(_) => SubplotMode::TupleXY,
        }
    }

    /// Regular-mode bindings; empty in TupleXY mode.
    pub fn signals(&self) -> &[SignalRef] {
        match &self.content {
            SubplotContent::Regular(refs) => refs,
            SubplotContent::TupleXY(_) => &[],
        }
    }

    /// Tuple pairs; empty in Regular mode.
    pub fn pairs(&self) -> &[TuplePair] {
        match &self.content {
            SubplotContent::Regular(_) => &[],
            SubplotContent::TupleXY(pairs) => pairs,
        }
    }

    /// Whether anything worth carrying over a resize is set on this cell.
    /// A TupleXY cell always counts, even without pairs.
    pub fn has_binding(&self) -> bool {
        let has_content = match &self.content {
            SubplotContent::Regular(refs) => !refs.is_empty(),
            SubplotContent::TupleXY(_) => true,
        };
        has_content || self.x_axis != XAxisSelection::Time || self.custom_y_label.is_some()
    }

    /// Every signal name referenced by this cell, tuple pairs included.
    pub fn referenced_names(&self) -> Vec<&str> {
        match &self.content {
            SubplotContent::Regular(refs) => refs.iter().map(|r| r.name.as_str()).collect(),
            SubplotContent::TupleXY(pairs) => pairs
                .iter()
                .flat_map(|p| [p.x.name.as_str(), p.y.name.as_str()])
                .collect(),
        }
    }

    pub fn assign(&mut self, signal: SignalRef) -> Result<()> {
        match &mut self.content {
            SubplotContent::Regular(refs) => {
                if refs.contains(&signal) {
                    return Err(PlotGridError::DuplicateBinding(signal));
                }
                refs.push(signal);
                Ok(())
            }
            SubplotContent::TupleXY(_) => Err(PlotGridError::WrongMode {
                expected: SubplotMode::Regular.as_str(),
            }),
        }
    }

    /// Remove a Regular binding. Returns `false` if it was not bound.
    pub fn unassign(&mut self, signal: &SignalRef) -> bool {
        match &mut self.content {
            SubplotContent::Regular(refs) => {
                let before = refs.len();
                refs.retain(|r| r != signal);
                refs.len() != before
            }
            SubplotContent::TupleXY(_) => false,
        }
    }

    /// Switch between Regular and TupleXY, discarding the old mode's data.
    pub fn toggle_mode(&mut self) -> SubplotMode {
        self.content = match self.content {
            SubplotContent::Regular(_) => SubplotContent::TupleXY(Vec::new()),
            SubplotContent::TupleXY(_) => SubplotContent::Regular(Vec::new()),
        };
        self.mode()
    }

    pub fn add_pair(&mut self, pair: TuplePair) -> Result<()> {
        match &mut self.content {
            SubplotContent::TupleXY(pairs) => {
                pairs.push(pair);
                Ok(())
            }
            SubplotContent::Regular(_) => Err(PlotGridError::WrongMode {
                expected: SubplotMode::TupleXY.as_str(),
            }),
        }
    }

    pub fn remove_pair(&mut self, index: usize) -> Result<TuplePair> {
        match &mut self.content {
            SubplotContent::TupleXY(pairs) if index < pairs.len() => Ok(pairs.remove(index)),
            SubplotContent::TupleXY(pairs) => Err(PlotGridError::PairOutOfRange {
                index,
                count: pairs.len(),
            }),
            SubplotContent::Regular(_) => Err(PlotGridError::WrongMode {
                expected: SubplotMode::TupleXY.as_str(),
            }),
        }
    }

    /// Empty the current mode's list, keeping the mode itself.
    pub fn clear(&mut self) {
        match &mut self.content {
            SubplotContent::Regular(refs) => refs.clear(),
            SubplotContent::TupleXY(pairs) => pairs.clear(),
        }
    }
}
