//! Per-subplot render state: what is currently drawn and with which limits.

use egui::Color32;

/// Visible X and Y ranges of one plot surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotLimits {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl PlotLimits {
    pub fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        Self { x, y }
    }

    /// Tight bounds of a point set, ignoring non-finite coordinates.
    pub fn from_points(points: &[[f64; 2]]) -> Option<Self> {
        let mut limits: Option<Self> = None;
        for p in points {
            if !(p[0].is_finite() && p[1].is_finite()) {
                continue;
            }
            let pl = Self::new((p[0], p[0]), (p[1], p[1]));
            limits = Some(match limits {
                Some(l) => l.union(&pl),
                None => pl,
            });
        }
        limits
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            x: (self.x.0.min(other.x.0), self.x.1.max(other.x.1)),
            y: (self.y.0.min(other.y.0), self.y.1.max(other.y.1)),
        }
    }

    /// Grow each side by a fraction of the span. A zero span grows by 0.5 so
    /// the range stays drawable.
    pub fn padded(&self, x_frac: f64, y_frac: f64) -> Self {
        fn pad(range: (f64, f64), frac: f64) -> (f64, f64) {
            let span = range.1 - range.0;
            let d = if span > 0.0 { span * frac } else { 0.5 };
            (range.0 - d, range.1 + d)
        }
        Self {
            x: pad(self.x, x_frac),
            y: pad(self.y, y_frac),
        }
    }

    /// Widen degenerate (zero-span) axes by 0.5 on each side, leave others untouched.
    pub fn non_degenerate(&self) -> Self {
        fn widen(range: (f64, f64)) -> (f64, f64) {
            if range.1 > range.0 {
                range
            } else {
                (range.0 - 0.5, range.1 + 0.5)
            }
        }
        Self {
            x: widen(self.x),
            y: widen(self.y),
        }
    }

    pub fn contains(&self, other: &Self) -> bool {
        self.x.0 <= other.x.0 && self.x.1 >= other.x.1 && self.y.0 <= other.y.0 && self.y.1 >= other.y.1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawnKind {
    /// Continuous line through every sample.
    Trace,
    /// Discrete markers at the samples where a state signal changes value.
    Markers,
}

/// One series as it is currently drawn, identified by its display name.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnSeries {
    pub name: String,
    pub kind: DrawnKind,
    pub points: Vec<[f64; 2]>,
    pub color: Color32,
    pub width: f32,
}

/// Render surface of one grid cell. Recreated whenever the tab's grid shape changes.
#[derive(Debug, Clone, Default)]
pub struct PlotSurface {
    pub series: Vec<DrawnSeries>,
    /// Limits applied after the last refresh (or the last pan/zoom).
    pub limits: Option<PlotLimits>,
    /// Limits set interactively, kept when a refresh finds no data to fit.
    pub manual_limits: Option<PlotLimits>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Shared X-axis link group, set while axis linking is enabled.
    pub link_group: Option<u64>,
}

impl PlotSurface {
    pub fn has_content(&self) -> bool {
        !self.series.is_empty()
    }

    pub fn clear_series(&mut self) {
        self.series.clear();
    }

    /// Insert or update a series by display name. Returns `true` if an
    /// existing series was mutated in place.
    pub(crate) fn upsert(&mut self, series: DrawnSeries, in_place: bool) -> bool {
        if in_place {
            if let Some(existing) = self.series.iter_mut().find(|s| s.name == series.name) {
                existing.kind = series.kind;
                existing.points = series.points;
                existing.color = series.color;
                existing.width = series.width;
                return true;
            }
        }
        self.series.push(series);
        false
    }

    /// Drop series whose display name is not in `keep`. Returns how many were removed.
    pub(crate) fn retain_named(&mut self, keep: &[String]) -> usize {
        let before = self.series.len();
        self.series.retain(|s| keep.iter().any(|k| k == &s.name));
        before - self.series.len()
    }

    /// Union of the bounds of every drawn series.
    pub fn data_bounds(&self) -> Option<PlotLimits> {
        self.series
            .iter()
            .filter_map(|s| PlotLimits::from_points(&s.points))
            .reduce(|a, b| a.union(&b))
    }

    /// Apply an interactive pan/zoom X range.
    pub fn set_manual_x(&mut self, x: (f64, f64)) {
        let y = self
            .limits
            .or(self.manual_limits)
            .map(|l| l.y)
            .unwrap_or((0.0, 1.0));
        let limits = PlotLimits::new(x, y);
        self.limits = Some(limits);
        self.manual_limits = Some(limits);
    }

    /// Apply an interactive pan/zoom on both axes.
    pub fn set_manual_limits(&mut self, limits: PlotLimits) {
        self.limits = Some(limits);
        self.manual_limits = Some(limits);
    }
}
