//! Workspace: the ordered tabs plus the global "current" selection.

use crate::data::signal::{SignalRef, TuplePair, XAxisSelection};
use crate::data::subplot::{Subplot, SubplotMode};
use crate::data::tab::{GridShape, Tab};
use crate::error::{PlotGridError, Result};

#[derive(Debug, Clone)]
pub struct Workspace {
    tabs: Vec<Tab>,
    selected_tab: usize,
    selected_subplot: usize,
    next_tab_id: u64,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(GridShape::single())
    }
}

impl Workspace {
    /// A workspace always starts with one tab.
    pub fn new(shape: GridShape) -> Self {
        let mut ws = Self {
            tabs: Vec::new(),
            selected_tab: 0,
            selected_subplot: 0,
            next_tab_id: 0,
        };
        ws.add_tab(shape);
        ws
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn tab(&self, index: usize) -> Result<&Tab> {
        let count = self.tabs.len();
        self.tabs
            .get(index)
            .ok_or(PlotGridError::TabOutOfRange { index, count })
    }

    pub fn tab_mut(&mut self, index: usize) -> Result<&mut Tab> {
        let count = self.tabs.len();
        self.tabs
            .get_mut(index)
            .ok_or(PlotGridError::TabOutOfRange { index, count })
    }

    pub(crate) fn tabs_mut(&mut self) -> &mut [Tab] {
        &mut self.tabs
    }

    pub fn subplot(&self, tab: usize, subplot: usize) -> Result<&Subplot> {
        self.tab(tab)?.subplot(subplot)
    }

    pub fn subplot_mut(&mut self, tab: usize, subplot: usize) -> Result<&mut Subplot> {
        self.tab_mut(tab)?.subplot_mut(subplot)
    }

    pub fn selected_tab(&self) -> usize {
        self.selected_tab
    }

    pub fn selected_subplot(&self) -> usize {
        self.selected_subplot
    }

    /// Append a tab and return its index. Selection is left unchanged.
    pub fn add_tab(&mut self, shape: GridShape) -> usize {
        self.next_tab_id += 1;
        let title = format!("Tab {}", self.next_tab_id);
        self.tabs.push(Tab::new(self.next_tab_id, title, shape));
        self.tabs.len() - 1
    }

    /// Close a tab. The last remaining tab cannot be closed.
    pub fn close_tab(&mut self, index: usize) -> Result<Tab> {
        self.tab(index)?;
        if self.tabs.len() == 1 {
            return Err(PlotGridError::LastTab);
        }
        let removed = self.tabs.remove(index);
        if self.selected_tab > index || self.selected_tab >= self.tabs.len() {
            self.selected_tab = self.selected_tab.saturating_sub(1);
        }
        self.clamp_selected_subplot();
        Ok(removed)
    }

    pub fn select_tab(&mut self, index: usize) -> Result<()> {
        self.tab(index)?;
        self.selected_tab = index;
        self.clamp_selected_subplot();
        Ok(())
    }

    pub fn select_subplot(&mut self, index: usize) -> Result<()> {
        self.tab(self.selected_tab)?.subplot(index)?;
        self.selected_subplot = index;
        Ok(())
    }

    /// Keep the subplot pointer inside the selected tab's grid.
    pub(crate) fn clamp_selected_subplot(&mut self) {
        let count = self
            .tabs
            .get(self.selected_tab)
            .map(|t| t.subplots().len())
            .unwrap_or(1);
        if self.selected_subplot >= count {
            self.selected_subplot = count.saturating_sub(1);
        }
    }

    pub fn set_tab_title(&mut self, tab: usize, title: impl Into<String>) -> Result<()> {
        self.tab_mut(tab)?.title = title.into();
        Ok(())
    }

    pub fn assign(&mut self, tab: usize, subplot: usize, signal: SignalRef) -> Result<()> {
        self.subplot_mut(tab, subplot)?.assign(signal)
    }

    pub fn unassign(&mut self, tab: usize, subplot: usize, signal: &SignalRef) -> Result<bool> {
        Ok(self.subplot_mut(tab, subplot)?.unassign(signal))
    }

    pub fn set_x_axis(&mut self, tab: usize, subplot: usize, x_axis: XAxisSelection) -> Result<()> {
        self.subplot_mut(tab, subplot)?.x_axis = x_axis;
        Ok(())
    }

    pub fn toggle_tuple_mode(&mut self, tab: usize, subplot: usize) -> Result<SubplotMode> {
        Ok(self.subplot_mut(tab, subplot)?.toggle_mode())
    }

    pub fn add_tuple_pair(&mut self, tab: usize, subplot: usize, pair: TuplePair) -> Result<()> {
        self.subplot_mut(tab, subplot)?.add_pair(pair)
    }

    pub fn remove_tuple_pair(&mut self, tab: usize, subplot: usize, pair: usize) -> Result<TuplePair> {
        self.subplot_mut(tab, subplot)?.remove_pair(pair)
    }

    pub fn clear_subplot(&mut self, tab: usize, subplot: usize) -> Result<()> {
        self.subplot_mut(tab, subplot)?.clear();
        Ok(())
    }

    pub fn set_custom_y_label(&mut self, tab: usize, subplot: usize, label: Option<String>) -> Result<()> {
        self.subplot_mut(tab, subplot)?.custom_y_label = label.filter(|l| !l.is_empty());
        Ok(())
    }

    /// Replace every tab, e.g. when restoring a snapshot. An empty list keeps one fresh tab.
    pub(crate) fn replace_tabs(&mut self, tabs: Vec<Tab>, selected_tab: usize) {
        self.next_tab_id = tabs.iter().map(Tab::id).max().unwrap_or(0);
        self.tabs = tabs;
        if self.tabs.is_empty() {
            self.add_tab(GridShape::single());
        }
        self.selected_tab = selected_tab.min(self.tabs.len() - 1);
        self.selected_subplot = 0;
    }

    pub(crate) fn next_tab_id(&mut self) -> u64 {
        self.next_tab_id += 1;
        self.next_tab_id
    }

    /// Every bound location of every Regular signal and tuple signal, in tab/subplot order.
    pub fn binding_locations(&self) -> impl Iterator<Item = (usize, usize, &str)> {
        self.tabs.iter().enumerate().flat_map(|(t, tab)| {
            tab.subplots()
                .iter()
                .enumerate()
                .flat_map(move |(s, sp)| sp.referenced_names().into_iter().map(move |n| (t, s, n)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_selected_last_tab_moves_selection_back() {
        let mut ws = Workspace::default();
        ws.add_tab(GridShape::single());
        ws.add_tab(GridShape::single());
        ws.select_tab(2).unwrap();
        ws.close_tab(2).unwrap();
        assert_eq!(ws.selected_tab(), 1);
    }

    #[test]
    fn closing_earlier_tab_keeps_selected_tab_identity() {
        let mut ws = Workspace::default();
        ws.add_tab(GridShape::single());
        let id = ws.tab(1).unwrap().id();
        ws.select_tab(1).unwrap();
        ws.close_tab(0).unwrap();
        assert_eq!(ws.tab(ws.selected_tab()).unwrap().id(), id);
    }

    #[test]
    fn last_tab_cannot_be_closed() {
        let mut ws = Workspace::default();
        assert!(matches!(ws.close_tab(0), Err(PlotGridError::LastTab)));
        assert_eq!(ws.tab_count(), 1);
    }
}
