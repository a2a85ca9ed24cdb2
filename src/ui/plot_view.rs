//! Draws one [`PlotSurface`] with `egui_plot`.

use egui_plot::{Legend, Line, Plot, Points};

use crate::render::surface::{DrawnKind, PlotLimits, PlotSurface};

#[derive(Debug, Clone, Copy)]
pub struct PlotViewStyle {
    pub show_legend: bool,
    pub marker_radius: f32,
}

/// Show `surface` and report the new visible range if the user panned or zoomed.
pub fn show_surface(ui: &mut egui::Ui, id: egui::Id, surface: &PlotSurface, style: PlotViewStyle) -> Option<PlotLimits> {
    let mut plot = Plot::new(id).allow_scroll(false).allow_boxed_zoom(true);
    if style.show_legend {
        plot = plot.legend(Legend::default());
    }
    if let Some(label) = &surface.x_label {
        plot = plot.x_axis_label(label.clone());
    }
    if let Some(label) = &surface.y_label {
        plot = plot.y_axis_label(label.clone());
    }

    let plot_resp = plot.show(ui, |plot_ui| {
        let resp = plot_ui.response();
        let is_zooming_rect = resp.drag_stopped_by(egui::PointerButton::Secondary);
        let is_panning = resp.dragged_by(egui::PointerButton::Primary) && resp.is_pointer_button_down_on();
        let scroll = resp.ctx.input(|i| i.raw_scroll_delta);
        let is_zooming_with_wheel = (scroll.x != 0.0 || scroll.y != 0.0) && resp.hovered();
        let interacting = is_zooming_rect || is_panning || is_zooming_with_wheel;

        if !interacting {
            if let Some(limits) = surface.limits {
                plot_ui.set_plot_bounds_x(limits.x.0..=limits.x.1);
                plot_ui.set_plot_bounds_y(limits.y.0..=limits.y.1);
            }
        }

        for series in &surface.series {
            match series.kind {
                DrawnKind::Trace => {
                    plot_ui.line(
                        Line::new(&series.name, series.points.clone())
                            .color(series.color)
                            .width(series.width),
                    );
                }
                DrawnKind::Markers => {
                    plot_ui.points(
                        Points::new(&series.name, series.points.clone())
                            .radius(style.marker_radius)
                            .color(series.color),
                    );
                }
            }
        }
        interacting
    });

    if !plot_resp.inner {
        return None;
    }
    let bounds = plot_resp.transform.bounds();
    let (rx, ry) = (bounds.range_x(), bounds.range_y());
    let limits = PlotLimits::new((*rx.start(), *rx.end()), (*ry.start(), *ry.end()));
    let finite = [limits.x.0, limits.x.1, limits.y.0, limits.y.1]
        .iter()
        .all(|v| v.is_finite());
    (finite && limits.x.0 < limits.x.1).then_some(limits)
}
