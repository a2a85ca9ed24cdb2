//! Axis-limit policy applied after a subplot's series are drawn.

use crate::render::surface::{PlotLimits, PlotSurface};

/// Padding and fallback ranges used by [`apply_limit_policy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitSettings {
    pub x_padding: f64,
    pub y_padding: f64,
    pub default_limits: PlotLimits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitDecision {
    /// Static data: fit exactly to the drawn data.
    Fitted,
    /// Streaming with prior content: union of the old limits and the padded new bounds.
    Grown,
    /// Streaming on an empty surface: padded new bounds.
    Initialized,
    /// No data: previous manual limits kept.
    KeptManual,
    /// No data and nothing manual: neutral default range.
    Defaulted,
}

/// Decide the limits of `surface` from its current data.
///
/// `had_content` is whether the surface showed anything before this pass.
pub fn apply_limit_policy(surface: &mut PlotSurface, streaming: bool, had_content: bool, settings: &LimitSettings) -> LimitDecision {
    let Some(bounds) = surface.data_bounds() else {
        return match surface.manual_limits {
            Some(manual) => {
                surface.limits = Some(manual);
                LimitDecision::KeptManual
            }
            None => {
                surface.limits = Some(settings.default_limits);
                LimitDecision::Defaulted
            }
        };
    };

    if !streaming {
        surface.limits = Some(bounds.non_degenerate());
        surface.manual_limits = None;
        return LimitDecision::Fitted;
    }

    let padded = bounds.padded(settings.x_padding, settings.y_padding);
    match surface.limits.filter(|_| had_content) {
        Some(previous) => {
            surface.limits = Some(previous.union(&padded));
            LimitDecision::Grown
        }
        None => {
            surface.limits = Some(padded);
            LimitDecision::Initialized
        }
    }
}
