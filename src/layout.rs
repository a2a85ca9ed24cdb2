//! Grid resizing with binding remapping.
//!
//! A resize rebuilds the whole subplot list. Each old cell that carries a
//! binding is decoded into its 1-based (row, col) under the old shape and
//! moved to a new cell chosen by the first strategy that applies:
//!
//! 1. **Direct** – the old position still exists: same (row, col).
//! 2. **Column preserved** – the grid gains columns, the cell sat in column 1
//!    and its row still exists: stay in column 1.
//! 3. **Proportional** – scale the old row/col ratios onto the new grid.
//!
//! When two old cells land on the same new cell the one processed later
//! (higher old index) wins and the earlier binding is lost.

use tracing::debug;

use crate::data::subplot::Subplot;
use crate::data::tab::{GridShape, Tab};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemapStrategy {
    Direct,
    ColumnPreserved,
    Proportional,
}

/// New 0-based index (and the strategy that produced it) for a binding at
/// `old_index` under `old`. `None` if `old_index` is outside the old grid.
pub fn remap_index(old: GridShape, new: GridShape, old_index: usize) -> Option<(usize, RemapStrategy)> {
    if old_index >= old.cell_count() {
        return None;
    }
    let (old_row, old_col) = old.position(old_index);

    if old_row <= new.rows() && old_col <= new.cols() {
        return Some((new.index(old_row, old_col), RemapStrategy::Direct));
    }

    if new.cols() > old.cols() && old_col == 1 && old_row <= new.rows() {
        return Some((new.index(old_row, 1), RemapStrategy::ColumnPreserved));
    }

    let row = scale_position(old_row, old.rows(), new.rows());
    let col = scale_position(old_col, old.cols(), new.cols());
    Some((new.index(row, col), RemapStrategy::Proportional))
}

/// Map a 1-based position in a dimension of `old_len` onto one of `new_len`.
fn scale_position(pos: usize, old_len: usize, new_len: usize) -> usize {
    let ratio = if old_len > 1 {
        (pos - 1) as f64 / (old_len - 1) as f64
    } else {
        0.0
    };
    let scaled = (ratio * (new_len - 1) as f64).round() as usize + 1;
    scaled.clamp(1, new_len)
}

/// Build the subplot list for `new` from `old_subplots` laid out as `old`.
pub fn remap_subplots(old: GridShape, new: GridShape, old_subplots: &[Subplot]) -> Vec<Subplot> {
    let mut remapped = vec![Subplot::default(); new.cell_count()];
    let mut filled = vec![false; new.cell_count()];
    for (old_index, subplot) in old_subplots.iter().enumerate() {
        if !subplot.has_binding() {
            continue;
        }
        match remap_index(old, new, old_index) {
            Some((new_index, strategy)) if new_index < remapped.len() => {
                if filled[new_index] {
                    debug!(old_index, new_index, "resize collision: earlier binding overwritten");
                }
                debug!(old_index, new_index, ?strategy, "remapped subplot binding");
                remapped[new_index] = subplot.clone();
                filled[new_index] = true;
            }
            _ => debug!(old_index, "binding dropped: no position in new grid"),
        }
    }
    remapped
}

/// Reshape a tab to `rows` x `cols`, transplanting bindings. Returns `false`
/// when the shape is unchanged. Invalid dimensions are rejected without
/// touching the tab.
pub fn resize(tab: &mut Tab, rows: usize, cols: usize) -> Result<bool> {
    let new = GridShape::new(rows, cols)?;
    let old = tab.shape();
    if new == old {
        return Ok(false);
    }
    let subplots = remap_subplots(old, new, tab.subplots());
    tab.replace_grid(new, subplots);
    debug!(tab = tab.id(), from = ?old, to = ?new, "tab resized");
    Ok(true)
}
