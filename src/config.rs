//! Configuration for the render pipeline and the egui front end.
//!
//! Every field has a default, so partial YAML/JSON files are accepted.

use std::path::Path;
use std::time::Duration;

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::render::limits::LimitSettings;
use crate::render::surface::PlotLimits;
use crate::style::DEFAULT_PALETTE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotGridConfig {
    /// Series longer than this are decimated before drawing.
    pub max_points: usize,
    /// Fraction of the X span added on each side while streaming.
    pub x_padding: f64,
    /// Fraction of the Y span added on each side while streaming.
    pub y_padding: f64,
    pub default_x_range: [f64; 2],
    pub default_y_range: [f64; 2],
    pub line_width: f32,
    pub marker_radius: f32,
    /// RGBA palette cycled for signals without an explicit color.
    pub palette: Vec<[u8; 4]>,
    /// Delay before a tab switch's follow-up refresh runs.
    pub deferred_delay_ms: u64,
    /// How often the front end polls for streamed data.
    pub poll_interval_ms: u64,
    pub default_rows: usize,
    pub default_cols: usize,
    pub show_legend: bool,
    pub title: String,
}

impl Default for PlotGridConfig {
    fn default() -> Self {
        Self {
            max_points: 50_000,
            x_padding: 0.05,
            y_padding: 0.10,
            default_x_range: [0.0, 1.0],
            default_y_range: [0.0, 1.0],
            line_width: 1.5,
            marker_radius: 4.0,
            palette: DEFAULT_PALETTE
                .iter()
                .map(|c| [c.r(), c.g(), c.b(), c.a()])
                .collect(),
            deferred_delay_ms: 50,
            poll_interval_ms: 100,
            default_rows: 1,
            default_cols: 1,
            show_legend: true,
            title: "PlotGrid".to_string(),
        }
    }
}

impl PlotGridConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file (chosen by extension; YAML otherwise).
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&text)?)
        } else {
            Self::from_yaml(&text)
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn palette_colors(&self) -> Vec<Color32> {
        if self.palette.is_empty() {
            return DEFAULT_PALETTE.to_vec();
        }
        self.palette
            .iter()
            .map(|c| Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3]))
            .collect()
    }

    pub fn limit_settings(&self) -> LimitSettings {
        LimitSettings {
            x_padding: self.x_padding,
            y_padding: self.y_padding,
            default_limits: PlotLimits::new(
                (self.default_x_range[0], self.default_x_range[1]),
                (self.default_y_range[0], self.default_y_range[1]),
            ),
        }
    }

    pub fn deferred_delay(&self) -> Duration {
        Duration::from_millis(self.deferred_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
