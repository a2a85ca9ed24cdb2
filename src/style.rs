//! Draw colors and line widths for bound signals.

use std::collections::{HashMap, HashSet};

use egui::Color32;

use crate::data::signal::SignalRef;

/// Ten-color cyclic palette used when a signal has no explicit color.
pub const DEFAULT_PALETTE: [Color32; 10] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(214, 39, 40),
    Color32::from_rgb(148, 103, 189),
    Color32::from_rgb(140, 86, 75),
    Color32::from_rgb(227, 119, 194),
    Color32::from_rgb(127, 127, 127),
    Color32::from_rgb(188, 189, 34),
    Color32::from_rgb(23, 190, 207),
];

/// Palette color for the given index, wrapping around.
pub fn alloc_color(palette: &[Color32], index: usize) -> Color32 {
    if palette.is_empty() {
        return Color32::GRAY;
    }
    palette[index % palette.len()]
}

/// Explicit per-signal look. Unset fields fall back to the palette / configured width.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalStyle {
    pub color: Option<Color32>,
    pub width: Option<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct SignalStyles {
    styles: HashMap<SignalRef, SignalStyle>,
}

impl SignalStyles {
    pub fn get(&self, signal: &SignalRef) -> Option<&SignalStyle> {
        self.styles.get(signal)
    }

    pub fn set_color(&mut self, signal: SignalRef, color: Color32) {
        self.styles.entry(signal).or_default().color = Some(color);
    }

    pub fn set_width(&mut self, signal: SignalRef, width: f32) {
        self.styles.entry(signal).or_default().width = Some(width.max(0.1));
    }

    pub fn clear(&mut self, signal: &SignalRef) -> bool {
        self.styles.remove(signal).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SignalRef, &SignalStyle)> {
        self.styles.iter()
    }

    pub fn insert(&mut self, signal: SignalRef, style: SignalStyle) {
        self.styles.insert(signal, style);
    }
}

/// Hands out palette colors within one subplot, skipping colors already
/// taken by explicit overrides or earlier signals.
#[derive(Debug)]
pub struct ColorAllocator<'a> {
    palette: &'a [Color32],
    used: HashSet<Color32>,
    cursor: usize,
}

impl<'a> ColorAllocator<'a> {
    pub fn new(palette: &'a [Color32]) -> Self {
        Self {
            palette,
            used: HashSet::new(),
            cursor: 0,
        }
    }

    pub fn reserve(&mut self, color: Color32) {
        self.used.insert(color);
    }

    /// Next unused palette color; once the palette is exhausted, keep cycling.
    pub fn next_color(&mut self) -> Color32 {
        let len = self.palette.len().max(1);
        for offset in 0..len {
            let candidate = alloc_color(self.palette, self.cursor + offset);
            if !self.used.contains(&candidate) {
                self.cursor += offset + 1;
                self.used.insert(candidate);
                return candidate;
            }
        }
        let color = alloc_color(self.palette, self.cursor);
        self.cursor += 1;
        color
    }
}
