//! X-axis linking between subplots of one tab.
//!
//! With linking enabled, the tab's Regular-mode subplots are grouped by X-axis
//! selection (all time-based subplots form one group, each custom X signal
//! its own). Groups of two or more share their visible X range: a pan/zoom on
//! one member is propagated to the others and to nobody else. TupleXY
//! subplots never take part.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::debug;

use crate::data::signal::XAxisSelection;
use crate::data::subplot::SubplotMode;
use crate::data::tab::Tab;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct LinkGroup {
    pub key: XAxisSelection,
    /// Subplot indices, ascending.
    pub members: Vec<usize>,
    /// Identifier handed to the plotting widget to tie the axes together.
    pub id: u64,
}

impl LinkGroup {
    pub fn contains(&self, subplot: usize) -> bool {
        self.members.contains(&subplot)
    }
}

fn group_id(tab_id: u64, key: &XAxisSelection) -> u64 {
    let mut hasher = DefaultHasher::new();
    tab_id.hash(&mut hasher);
    key.hash(&mut hasher);
    hasher.finish()
}

/// Partition a tab's Regular subplots by X-axis selection, keeping groups
/// with more than one member, in order of first appearance.
pub fn compute_groups(tab: &Tab) -> Vec<LinkGroup> {
    let mut groups: Vec<LinkGroup> = Vec::new();
    for (i, subplot) in tab.subplots().iter().enumerate() {
        if subplot.mode() != SubplotMode::Regular {
            continue;
        }
        match groups.iter_mut().find(|g| g.key == subplot.x_axis) {
            Some(group) => group.members.push(i),
            None => groups.push(LinkGroup {
                key: subplot.x_axis.clone(),
                members: vec![i],
                id: group_id(tab.id(), &subplot.x_axis),
            }),
        }
    }
    groups.retain(|g| g.members.len() > 1);
    groups
}

/// Enable or disable linking for a tab.
pub fn set_linking(tab: &mut Tab, enabled: bool) {
    tab.set_linking_flag(enabled);
    regroup(tab);
}

/// Recompute groups after a layout or X-axis change. Clears every link when
/// linking is disabled.
pub fn regroup(tab: &mut Tab) {
    let groups = if tab.linking_enabled() {
        compute_groups(tab)
    } else {
        Vec::new()
    };
    for surface in tab.surfaces_mut() {
        surface.link_group = None;
    }
    for group in &groups {
        for &member in &group.members {
            if let Some(surface) = tab.surfaces_mut().get_mut(member) {
                surface.link_group = Some(group.id);
            }
        }
    }
    debug!(tab = tab.id(), groups = groups.len(), "axis link groups recomputed");
    tab.set_link_groups(groups);
}

pub fn group_of(tab: &Tab, subplot: usize) -> Option<&LinkGroup> {
    tab.link_groups().iter().find(|g| g.contains(subplot))
}

/// Apply an interactive X range to `subplot` and to the rest of its link
/// group. Returns every subplot whose range changed.
pub fn pan_zoom(tab: &mut Tab, subplot: usize, x: (f64, f64)) -> Result<Vec<usize>> {
    tab.subplot(subplot)?;
    let targets = match group_of(tab, subplot) {
        Some(group) => group.members.clone(),
        None => vec![subplot],
    };
    for &member in &targets {
        if let Some(surface) = tab.surfaces_mut().get_mut(member) {
            surface.set_manual_x(x);
        }
    }
    Ok(targets)
}
