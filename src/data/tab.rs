//! A tab: one grid of subplots with its own shape and axis-linking setting.

use crate::data::subplot::Subplot;
use crate::error::{PlotGridError, Result};
use crate::linking::LinkGroup;
use crate::render::surface::PlotSurface;

pub const MAX_GRID_DIM: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridShape {
    rows: usize,
    cols: usize,
}

impl GridShape {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if (1..=MAX_GRID_DIM).contains(&rows) && (1..=MAX_GRID_DIM).contains(&cols) {
            Ok(Self { rows, cols })
        } else {
            Err(PlotGridError::InvalidGridShape { rows, cols })
        }
    }

    pub fn single() -> Self {
        Self { rows: 1, cols: 1 }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// 1-based (row, col) of a 0-based row-major index.
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.cols + 1, index % self.cols + 1)
    }

    /// 0-based row-major index of a 1-based (row, col).
    pub fn index(&self, row: usize, col: usize) -> usize {
        (row - 1) * self.cols + (col - 1)
    }
}

impl Default for GridShape {
    fn default() -> Self {
        Self::single()
    }
}

#[derive(Debug, Clone)]
pub struct Tab {
    id: u64,
    pub title: String,
    shape: GridShape,
    subplots: Vec<Subplot>,
    surfaces: Vec<PlotSurface>,
    linking_enabled: bool,
    link_groups: Vec<LinkGroup>,
}

impl Tab {
    pub fn new(id: u64, title: impl Into<String>, shape: GridShape) -> Self {
        Self {
            id,
            title: title.into(),
            shape,
            subplots: vec![Subplot::default(); shape.cell_count()],
            surfaces: vec![PlotSurface::default(); shape.cell_count()],
            linking_enabled: false,
            link_groups: Vec::new(),
        }
    }

    /// Stable identity, unaffected by tabs being closed before this one.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn subplots(&self) -> &[Subplot] {
        &self.subplots
    }

    pub fn subplot(&self, index: usize) -> Result<&Subplot> {
        let count = self.subplots.len();
        self.subplots
            .get(index)
            .ok_or(PlotGridError::SubplotOutOfRange { index, count })
    }

    pub fn subplot_mut(&mut self, index: usize) -> Result<&mut Subplot> {
        let count = self.subplots.len();
        self.subplots
            .get_mut(index)
            .ok_or(PlotGridError::SubplotOutOfRange { index, count })
    }

    pub fn surfaces(&self) -> &[PlotSurface] {
        &self.surfaces
    }

    pub fn surface(&self, index: usize) -> Option<&PlotSurface> {
        self.surfaces.get(index)
    }

    pub(crate) fn surfaces_mut(&mut self) -> &mut [PlotSurface] {
        &mut self.surfaces
    }

    /// Bindings and their surfaces, borrowed together for a render pass.
    pub(crate) fn split_mut(&mut self) -> (&[Subplot], &mut [PlotSurface]) {
        (&self.subplots, &mut self.surfaces)
    }

    pub fn linking_enabled(&self) -> bool {
        self.linking_enabled
    }

    pub(crate) fn set_linking_flag(&mut self, enabled: bool) {
        self.linking_enabled = enabled;
    }

    pub fn link_groups(&self) -> &[LinkGroup] {
        &self.link_groups
    }

    pub(crate) fn set_link_groups(&mut self, groups: Vec<LinkGroup>) {
        self.link_groups = groups;
    }

    /// Install a new shape and subplot list. Surfaces are always reallocated
    /// to match; nothing drawn survives.
    pub(crate) fn replace_grid(&mut self, shape: GridShape, subplots: Vec<Subplot>) {
        debug_assert_eq!(subplots.len(), shape.cell_count());
        self.shape = shape;
        self.subplots = subplots;
        self.surfaces = vec![PlotSurface::default(); shape.cell_count()];
        self.link_groups.clear();
    }
}
