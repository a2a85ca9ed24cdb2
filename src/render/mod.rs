//! Render pipeline: turns subplot bindings plus source data into drawn series.
//!
//! A refresh walks the requested tabs and, per subplot:
//!
//! 1. decides between a full clear (static data, or an empty surface) and an
//!    incremental update that mutates series in place by display name;
//! 2. runs the mode's render function (`render_regular` or
//!    `render_tuples`), which resolves, filters, rescales and
//!    decimates every series and names it via [`crate::naming`];
//! 3. applies the axis-limit policy from [`limits`].
//!
//! Unresolvable references are skipped one at a time; the rest of the subplot
//! still renders.

pub mod limits;
pub mod series;
pub mod surface;

use std::collections::BTreeSet;

use egui::Color32;
use tracing::{debug, trace, warn};

use crate::config::PlotGridConfig;
use crate::data::signal::{SignalRef, SourceId, TuplePair, XAxisSelection};
use crate::data::source::SourceRegistry;
use crate::data::subplot::{Subplot, SubplotContent};
use crate::data::workspace::Workspace;
use crate::naming::{resolve_display_name, BindingSite, NameIndex, NamingPass};
use crate::style::{ColorAllocator, SignalStyles};

use limits::{apply_limit_policy, LimitSettings};
use series::{decimate, resample_linear, state_changes, Series};
use surface::{DrawnKind, DrawnSeries, PlotSurface};

/// Read-only inputs of a refresh.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub registry: &'a dyn SourceRegistry,
    pub index: &'a NameIndex,
    pub styles: &'a SignalStyles,
}

/// Counts gathered during one refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub subplots: usize,
    pub series: usize,
    pub skipped: usize,
    pub removed: usize,
}

/// What one mode's render function produced for a subplot.
#[derive(Debug, Default)]
struct SubplotFrame {
    series: Vec<DrawnSeries>,
    x_label: Option<String>,
    y_label: Option<String>,
    skipped: usize,
}

#[derive(Debug, Clone)]
pub struct RenderPipeline {
    max_points: usize,
    line_width: f32,
    palette: Vec<Color32>,
    limits: LimitSettings,
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(&PlotGridConfig::default())
    }
}

impl RenderPipeline {
    pub fn new(config: &PlotGridConfig) -> Self {
        Self {
            max_points: config.max_points,
            line_width: config.line_width,
            palette: config.palette_colors(),
            limits: config.limit_settings(),
        }
    }

    /// Re-derive the drawn content of `tabs` (all tabs when `None`).
    pub fn refresh(&self, workspace: &mut Workspace, ctx: RenderContext<'_>, tabs: Option<&[usize]>) -> RefreshStats {
        let streaming = ctx.registry.is_streaming();
        let tab_count = workspace.tab_count();
        let wanted: Option<BTreeSet<usize>> = tabs.map(|t| t.iter().copied().collect());
        if let Some(wanted) = &wanted {
            for &tab in wanted.range(tab_count..) {
                warn!(tab, "refresh: tab index out of range, ignored");
            }
        }
        let mut pass = NamingPass::new();
        let mut stats = RefreshStats::default();

        for tab_index in 0..tab_count {
            let Ok(tab) = workspace.tab_mut(tab_index) else {
                continue;
            };
            if wanted.as_ref().is_some_and(|w| !w.contains(&tab_index)) {
                advance_names(ctx, &mut pass, tab_index, tab.subplots());
                continue;
            }
            let (subplots, surfaces) = tab.split_mut();
            for (subplot_index, (subplot, surface)) in subplots.iter().zip(surfaces.iter_mut()).enumerate() {
                self.render_subplot(ctx, &mut pass, (tab_index, subplot_index), subplot, surface, streaming, &mut stats);
            }
        }
        debug!(?stats, streaming, "refresh finished");
        stats
    }

    #[allow(clippy::too_many_arguments)]
    fn render_subplot(
        &self,
        ctx: RenderContext<'_>,
        pass: &mut NamingPass,
        (tab, subplot_index): (usize, usize),
        subplot: &Subplot,
        surface: &mut PlotSurface,
        streaming: bool,
        stats: &mut RefreshStats,
    ) {
        let had_content = surface.has_content();
        let full_clear = !streaming || !had_content;
        if full_clear {
            surface.clear_series();
        }

        let frame = match &subplot.content {
            SubplotContent::Regular(refs) => {
                let site = BindingSite {
                    tab,
                    subplot: subplot_index,
                    siblings: refs,
                };
                self.render_regular(ctx, pass, site, &subplot.x_axis, subplot.custom_y_label.as_deref())
            }
            SubplotContent::TupleXY(pairs) => self.render_tuples(ctx, pairs),
        };

        let names: Vec<String> = frame.series.iter().map(|s| s.name.clone()).collect();
        stats.series += frame.series.len();
        stats.skipped += frame.skipped;
        for series in frame.series {
            surface.upsert(series, !full_clear);
        }
        if !full_clear {
            stats.removed += surface.retain_named(&names);
        }
        surface.x_label = frame.x_label;
        surface.y_label = frame.y_label;

        let decision = apply_limit_policy(surface, streaming, had_content, &self.limits);
        trace!(tab, subplot = subplot_index, ?decision, full_clear, "subplot rendered");
        stats.subplots += 1;
    }

    /// Regular mode: one series per bound signal, against time or a custom X signal.
    fn render_regular(
        &self,
        ctx: RenderContext<'_>,
        pass: &mut NamingPass,
        site: BindingSite<'_>,
        x_axis: &XAxisSelection,
        custom_y_label: Option<&str>,
    ) -> SubplotFrame {
        let mut frame = SubplotFrame::default();

        let custom_x = x_axis.signal().and_then(|xr| match lookup(ctx.registry, xr) {
            Some(xs) => Some((xr, xs.finite())),
            None => {
                warn!(signal = %xr, "custom X axis signal unavailable, falling back to time");
                None
            }
        });

        let mut colors = ColorAllocator::new(&self.palette);
        for r in site.siblings {
            if let Some(color) = ctx.styles.get(r).and_then(|s| s.color) {
                colors.reserve(color);
            }
        }

        for r in site.siblings {
            let Some(raw) = lookup(ctx.registry, r) else {
                debug!(signal = %r, "signal not found, skipped");
                frame.skipped += 1;
                continue;
            };
            let raw = raw.finite();
            let series = match &custom_x {
                Some((_, xs)) => against_signal(&raw, xs),
                None => raw,
            }
            .scaled(scale_of(ctx.registry, r));

            let name = resolve_display_name(ctx.index, pass, site, r);
            let style = ctx.styles.get(r);
            let color = style
                .and_then(|s| s.color)
                .unwrap_or_else(|| colors.next_color());
            let width = style.and_then(|s| s.width).unwrap_or(self.line_width);

            let (kind, drawn) = if is_state(ctx.registry, r) {
                (DrawnKind::Markers, decimate(state_changes(&series), self.max_points))
            } else {
                (DrawnKind::Trace, decimate(series, self.max_points))
            };
            frame.series.push(DrawnSeries {
                name,
                kind,
                points: drawn.points(),
                color,
                width,
            });
        }

        frame.x_label = Some(match &custom_x {
            Some((xr, _)) => xr.name.clone(),
            None => "Time".to_string(),
        });
        frame.y_label = custom_y_label.map(str::to_string);
        frame
    }

    /// TupleXY mode: one trace per pair, X and Y resolved independently.
    fn render_tuples(&self, ctx: RenderContext<'_>, pairs: &[TuplePair]) -> SubplotFrame {
        let mut frame = SubplotFrame::default();
        for (i, pair) in pairs.iter().enumerate() {
            let (Some(xs), Some(ys)) = (lookup(ctx.registry, &pair.x), lookup(ctx.registry, &pair.y)) else {
                debug!(x = %pair.x, y = %pair.y, "tuple pair unresolved, skipped");
                frame.skipped += 1;
                continue;
            };
            let xs = xs.scaled(scale_of(ctx.registry, &pair.x));
            let ys = ys.scaled(scale_of(ctx.registry, &pair.y));
            let series = decimate(pair_by_index(&xs, &ys), self.max_points);

            let mut name = pair.label.clone();
            if frame.series.iter().any(|s| s.name == name) {
                name = format!("{name} ({})", i + 1);
            }
            frame.series.push(DrawnSeries {
                name,
                kind: DrawnKind::Trace,
                points: series.points(),
                color: pair.color,
                width: ctx
                    .styles
                    .get(&pair.y)
                    .and_then(|s| s.width)
                    .unwrap_or(self.line_width),
            });
        }
        if let [only] = pairs {
            frame.x_label = Some(only.x.name.clone());
            frame.y_label = Some(only.y.name.clone());
        }
        frame
    }
}

/// Spend the naming counters a render of this tab would use, so a refresh of
/// some tabs names signals exactly like a refresh of all of them.
fn advance_names(ctx: RenderContext<'_>, pass: &mut NamingPass, tab: usize, subplots: &[Subplot]) {
    for (subplot_index, subplot) in subplots.iter().enumerate() {
        let SubplotContent::Regular(refs) = &subplot.content else {
            continue;
        };
        let site = BindingSite {
            tab,
            subplot: subplot_index,
            siblings: refs,
        };
        for r in refs.iter().filter(|r| resolvable(ctx.registry, r)) {
            resolve_display_name(ctx.index, pass, site, r);
        }
    }
}

fn resolvable(registry: &dyn SourceRegistry, signal: &SignalRef) -> bool {
    match signal.source {
        SourceId::Derived => registry.derived().names().iter().any(|n| *n == signal.name),
        SourceId::Index(i) => registry.source(i).is_some_and(|s| s.has_signal(&signal.name)),
    }
}

/// `(time, values)` of a reference, or `None` if its source or column is gone.
pub fn lookup(registry: &dyn SourceRegistry, signal: &SignalRef) -> Option<Series> {
    match signal.source {
        SourceId::Derived => registry
            .derived()
            .series(&signal.name)
            .map(|(t, v)| Series::from_columns(&t, &v)),
        SourceId::Index(i) => {
            let source = registry.source(i)?;
            let values = source.signal(&signal.name)?;
            Some(Series::from_columns(source.time(), values))
        }
    }
}

fn scale_of(registry: &dyn SourceRegistry, signal: &SignalRef) -> f64 {
    signal
        .source
        .index()
        .and_then(|i| registry.source(i))
        .map(|s| s.scale_for(&signal.name))
        .unwrap_or(1.0)
}

fn is_state(registry: &dyn SourceRegistry, signal: &SignalRef) -> bool {
    signal
        .source
        .index()
        .and_then(|i| registry.source(i))
        .is_some_and(|s| s.is_state(&signal.name))
}

/// Plot `y` against the values of `x`. Samples are matched by timestamp;
/// when the time grids differ `y` is resampled onto `x`'s grid.
fn against_signal(y: &Series, x: &Series) -> Series {
    let values = if y.x == x.x {
        y.y.clone()
    } else {
        resample_linear(&y.x, &y.y, &x.x)
    };
    Series {
        x: x.y.clone(),
        y: values,
    }
    .finite()
}

/// Pair two series sample-by-sample, keeping only indices valid in both.
fn pair_by_index(x: &Series, y: &Series) -> Series {
    Series {
        x: x.y.clone(),
        y: y.y.clone(),
    }
    .finite()
}
