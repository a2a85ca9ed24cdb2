//! Binding model: sources, signal references, subplots, tabs and the workspace.

pub mod signal;
pub mod source;
pub mod subplot;
pub mod tab;
pub mod workspace;
