//! PlotGrid crate root: re-exports and module wiring.
//!
//! Signals from loaded tabular sources are bound to the cells of tabbed
//! subplot grids and drawn with egui/egui_plot. The crate is organised as:
//! - `data`: sources, signal references, subplots, tabs and the workspace
//! - `layout`: grid resizing with binding remapping
//! - `naming`: reverse name index and display-name disambiguation
//! - `render`: the render pipeline, decimation and axis-limit policy
//! - `linking`: shared X ranges between subplots of one tab
//! - `deferred`: single-slot deferred follow-up work
//! - `persistence`: JSON workspace snapshots
//! - `sink`: channel for feeding sources into the running UI
//! - `ui`: the eframe application

pub mod config;
pub mod data;
pub mod deferred;
pub mod error;
pub mod layout;
pub mod linking;
pub mod naming;
pub mod persistence;
pub mod plot_grid;
pub mod render;
pub mod sink;
pub mod style;
pub mod ui;

// Public re-exports for a compact external API
pub use config::PlotGridConfig;
pub use data::signal::{SignalRef, SourceId, TuplePair, XAxisSelection};
pub use data::source::{DataSource, DerivedSignals, DerivedStore, InMemoryRegistry, SourceRegistry};
pub use data::subplot::{Subplot, SubplotContent, SubplotMode};
pub use data::tab::{GridShape, Tab};
pub use data::workspace::Workspace;
pub use error::{PlotGridError, Result};
pub use plot_grid::PlotGrid;
pub use render::surface::{DrawnKind, DrawnSeries, PlotLimits, PlotSurface};
pub use render::{RefreshStats, RenderPipeline};
pub use sink::{channel, SourceCommand, SourceSink};
pub use ui::{run_plotgrid, PlotGridApp};
