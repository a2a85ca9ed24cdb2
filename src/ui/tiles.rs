//! Lays a tab's subplot grid out as an `egui_tiles` tree.

use egui_tiles::{Behavior, Container, ContainerKind, TileId, Tiles, Tree, UiResponse};

use crate::data::tab::{GridShape, Tab};
use crate::render::surface::PlotLimits;
use crate::ui::plot_view::{show_surface, PlotViewStyle};

/// Identifier stored inside an `egui_tiles::Tree`, referencing a subplot by index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubplotPaneRef {
    pub index: usize,
}

/// One tree per grid shape: `rows` horizontal strips of `cols` panes, stacked vertically.
pub fn build_grid_tree(tree_id: egui::Id, shape: GridShape) -> Tree<SubplotPaneRef> {
    let cols = shape.cols();
    let mut tiles: Tiles<SubplotPaneRef> = Tiles::default();
    let pane_ids: Vec<TileId> = (0..shape.cell_count())
        .map(|index| tiles.insert_pane(SubplotPaneRef { index }))
        .collect();
    if pane_ids.is_empty() {
        return Tree::empty(tree_id);
    }

    let rows: Vec<TileId> = pane_ids
        .chunks(cols)
        .map(|chunk| tiles.insert_container(Container::new(ContainerKind::Horizontal, chunk.to_vec())))
        .collect();

    let root = if let [only] = rows.as_slice() {
        *only
    } else {
        tiles.insert_container(Container::new(ContainerKind::Vertical, rows))
    };
    Tree::new(tree_id, root, tiles)
}

/// Result of one frame of the grid.
#[derive(Debug, Default)]
pub struct GridFrame {
    /// Subplot whose pane was clicked.
    pub clicked: Option<usize>,
    /// User pan/zoom, as (subplot, new limits).
    pub view_changes: Vec<(usize, PlotLimits)>,
}

/// Render the tree sized to the available region.
pub fn render_tile_grid(
    ui: &mut egui::Ui,
    tree: &mut Tree<SubplotPaneRef>,
    tab: &Tab,
    selected: Option<usize>,
    style: PlotViewStyle,
) -> GridFrame {
    let mut frame = GridFrame::default();
    let desired = ui.available_size();
    if desired.min_elem() <= 0.0 {
        ui.label("Expand the window to see the plots.");
        return frame;
    }

    ui.allocate_ui(desired, |grid_ui| {
        grid_ui.set_min_size(desired);
        grid_ui.set_clip_rect(grid_ui.max_rect());
        tree.set_width(desired.x);
        tree.set_height(desired.y);
        let mut behavior = SubplotTilesBehavior {
            tab,
            selected,
            style,
            frame: &mut frame,
        };
        tree.ui(&mut behavior, grid_ui);
    });
    frame
}

struct SubplotTilesBehavior<'a> {
    tab: &'a Tab,
    selected: Option<usize>,
    style: PlotViewStyle,
    frame: &'a mut GridFrame,
}

impl SubplotTilesBehavior<'_> {
    fn pane_title(&self, index: usize) -> String {
        let (row, col) = self.tab.shape().position(index);
        let mode = self
            .tab
            .subplot(index)
            .map(|s| s.mode().as_str())
            .unwrap_or("Regular");
        format!("R{row}C{col} · {mode}")
    }
}

impl Behavior<SubplotPaneRef> for SubplotTilesBehavior<'_> {
    fn tab_title_for_pane(&mut self, pane: &SubplotPaneRef) -> egui::WidgetText {
        self.pane_title(pane.index).into()
    }

    fn pane_ui(&mut self, ui: &mut egui::Ui, tile_id: TileId, pane: &mut SubplotPaneRef) -> UiResponse {
        let Some(surface) = self.tab.surface(pane.index) else {
            ui.colored_label(egui::Color32::LIGHT_RED, "Missing subplot");
            return UiResponse::None;
        };
        let is_selected = self.selected == Some(pane.index);
        let frame = if is_selected {
            egui::Frame::group(ui.style()).stroke(ui.visuals().selection.stroke)
        } else {
            egui::Frame::group(ui.style())
        };
        frame.inner_margin(egui::Margin::symmetric(8, 6)).show(ui, |panel_ui| {
            panel_ui.set_min_size(panel_ui.available_size());
            let title = panel_ui.selectable_label(is_selected, self.pane_title(pane.index));
            if title.clicked() {
                self.frame.clicked = Some(pane.index);
            }
            let plot_id = panel_ui.id().with(("subplot", self.tab.id(), tile_id));
            if let Some(limits) = show_surface(panel_ui, plot_id, surface, self.style) {
                self.frame.view_changes.push((pane.index, limits));
            }
        });
        UiResponse::None
    }
}
