//! egui/eframe front end over [`PlotGrid`](crate::PlotGrid).

pub mod app;
pub mod plot_view;
pub mod tiles;

pub use app::{run_plotgrid, run_with_config, PlotGridApp};
pub use plot_view::{show_surface, PlotViewStyle};
