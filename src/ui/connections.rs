use crate::layout::{LayoutConfig, LayoutKey, PositionMap};
use crate::model::{BinaryNode, MaryNode};
use crate::ui::constants::{palette, CONNECTOR_WIDTH};
use crate::ui::surface::Surface;
use kurbo::{Line, Point};

/// Draws parent-to-child connectors for one layout pass. Connectors are
/// drawn before nodes so the nodes sit on top of the line ends.
pub struct ConnectionRenderer<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
    positions: &'a PositionMap,
    config: &'a LayoutConfig,
}

impl<'a, S: Surface + ?Sized> ConnectionRenderer<'a, S> {
    pub fn new(surface: &'a mut S, positions: &'a PositionMap, config: &'a LayoutConfig) -> Self {
        Self {
            surface,
            positions,
            config,
        }
    }

    pub fn draw_binary(&mut self, node: &BinaryNode) {
        let offset = self.config.node_radius;
        for child in node.children() {
            if self.connect(&LayoutKey::binary(node), &LayoutKey::binary(child), offset) {
                self.draw_binary(child);
            }
        }
    }

    pub fn draw_mary(&mut self, node: &MaryNode) {
        let offset = self.config.node_height / 2.0;
        for child in node.present_children() {
            if self.connect(&LayoutKey::mary(node), &LayoutKey::mary(child), offset) {
                self.draw_mary(child);
            }
        }
    }

    // A missing position (after a key collision) skips the connector and the
    // subtree below it.
    fn connect(&mut self, parent: &LayoutKey, child: &LayoutKey, edge_offset: f64) -> bool {
        let (Some(from), Some(to)) = (self.positions.get(parent), self.positions.get(child))
        else {
            tracing::debug!(%parent, %child, "connector skipped, position missing");
            return false;
        };

        let start = Point::new(from.center.x, from.center.y + edge_offset);
        let end = Point::new(to.center.x, to.center.y - edge_offset);
        self.surface
            .stroke_line(Line::new(start, end), palette::CONNECTOR, CONNECTOR_WIDTH);
        true
    }
}
