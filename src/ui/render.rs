use crate::layout::{snapshot_positions, LayoutConfig, PositionMap};
use crate::model::Snapshot;
use crate::ui::connections::ConnectionRenderer;
use crate::ui::constants::{palette, EMPTY_TREE_TEXT, LOAD_FAILED_TEXT};
use crate::ui::nodes::{draw_binary_node, draw_mary_node};
use crate::ui::surface::Surface;
use kurbo::Point;

/// Full layout pass: clears the surface and redraws the whole snapshot,
/// connectors first. Returns the positions used, or `None` when the
/// placeholder was drawn.
pub fn draw_tree<S: Surface + ?Sized>(
    surface: &mut S,
    snapshot: Option<&Snapshot>,
    config: &LayoutConfig,
) -> Option<PositionMap> {
    surface.clear();

    let Some(snapshot) = snapshot else {
        draw_placeholder(surface, EMPTY_TREE_TEXT);
        return None;
    };

    let center_x = surface.size().width / 2.0;
    let positions = snapshot_positions(snapshot, center_x, config);

    let mut connectors = ConnectionRenderer::new(surface, &positions, config);
    match snapshot {
        Snapshot::Binary(root) => connectors.draw_binary(root),
        Snapshot::Mary(root) => connectors.draw_mary(root),
    }
    for node in positions.iter() {
        if snapshot.is_mary() {
            draw_mary_node(surface, node, config);
        } else {
            draw_binary_node(surface, node, config);
        }
    }

    tracing::trace!(nodes = positions.len(), "layout pass drawn");
    Some(positions)
}

/// Replaces whatever was drawn with the "failed to load" placeholder.
pub fn draw_load_failure<S: Surface + ?Sized>(surface: &mut S) {
    surface.clear();
    draw_placeholder(surface, LOAD_FAILED_TEXT);
}

fn draw_placeholder<S: Surface + ?Sized>(surface: &mut S, text: &str) {
    let size = surface.size();
    surface.fill_text(
        Point::new(size.width / 2.0, size.height / 2.0),
        text,
        palette::PLACEHOLDER,
    );
}
