//! Error type shared by the model, the layout manager and persistence.

use crate::data::signal::SignalRef;

pub type Result<T> = std::result::Result<T, PlotGridError>;

#[derive(thiserror::Error, Debug)]
pub enum PlotGridError {
    #[error("tab index {index} out of range ({count} tabs)")]
    TabOutOfRange { index: usize, count: usize },

    #[error("subplot index {index} out of range ({count} subplots)")]
    SubplotOutOfRange { index: usize, count: usize },

    #[error("tuple pair index {index} out of range ({count} pairs)")]
    PairOutOfRange { index: usize, count: usize },

    #[error("invalid grid shape {rows}x{cols}: each dimension must be within 1..=10")]
    InvalidGridShape { rows: usize, cols: usize },

    #[error("cannot close the last remaining tab")]
    LastTab,

    #[error("signal {0} is already bound to this subplot")]
    DuplicateBinding(SignalRef),

    #[error("operation requires the subplot to be in {expected} mode")]
    WrongMode { expected: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported snapshot version {found} (newest supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}
