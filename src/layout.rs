use crate::model::{BinaryNode, MaryNode, Snapshot, KEY_SEPARATOR};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// Drawing defaults, all overridable through `LayoutConfig`.
pub const DEFAULT_VERTICAL_SPACING: f64 = 100.0;
pub const DEFAULT_TOP_MARGIN: f64 = 80.0;
pub const DEFAULT_BINARY_UNIT: f64 = 60.0;
pub const DEFAULT_MARY_UNIT: f64 = 80.0;
pub const DEFAULT_NODE_RADIUS: f64 = 25.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 60.0;
pub const DEFAULT_MIN_NODE_WIDTH: f64 = 150.0;
pub const DEFAULT_CORNER_RADIUS: f64 = 10.0;

/// Width each value adds to an m-ary box, plus the fixed padding around them.
pub const VALUE_SLOT_WIDTH: f64 = 30.0;
pub const VALUE_PADDING: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub vertical_spacing: f64,
    pub top_margin: f64,
    pub binary_unit: f64,
    pub mary_unit: f64,
    pub node_radius: f64,
    pub node_height: f64,
    pub min_node_width: f64,
    pub corner_radius: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            vertical_spacing: DEFAULT_VERTICAL_SPACING,
            top_margin: DEFAULT_TOP_MARGIN,
            binary_unit: DEFAULT_BINARY_UNIT,
            mary_unit: DEFAULT_MARY_UNIT,
            node_radius: DEFAULT_NODE_RADIUS,
            node_height: DEFAULT_NODE_HEIGHT,
            min_node_width: DEFAULT_MIN_NODE_WIDTH,
            corner_radius: DEFAULT_CORNER_RADIUS,
        }
    }
}

impl LayoutConfig {
    pub fn level_y(&self, level: u32) -> f64 {
        f64::from(level) * self.vertical_spacing + self.top_margin
    }

    /// Width of an m-ary box holding `count` values.
    pub fn mary_node_width(&self, count: usize) -> f64 {
        self.min_node_width
            .max(count as f64 * VALUE_SLOT_WIDTH + VALUE_PADDING)
    }
}

/// Identity of a node inside one position map. Keys are content-derived,
/// so equal values anywhere in a snapshot share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LayoutKey {
    Value(i64),
    Values(String),
    Root,
}

impl LayoutKey {
    pub fn binary(node: &BinaryNode) -> Self {
        LayoutKey::Value(node.value)
    }

    pub fn mary(node: &MaryNode) -> Self {
        if node.values.is_empty() {
            LayoutKey::Root
        } else {
            let joined = node
                .values
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(KEY_SEPARATOR);
            LayoutKey::Values(joined)
        }
    }
}

impl fmt::Display for LayoutKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutKey::Value(v) => write!(f, "{v}"),
            LayoutKey::Values(joined) => f.write_str(joined),
            LayoutKey::Root => f.write_str("root"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub key: LayoutKey,
    pub center: Point,
    pub level: u32,
    pub values: Vec<i64>,
}

/// Node positions for one layout pass, in insertion order.
///
/// Inserting a key that is already present replaces the stored position but
/// keeps the original slot, so iteration order is the order in which keys
/// were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionMap {
    nodes: Vec<PositionedNode>,
    index: HashMap<LayoutKey, usize>,
    collisions: usize,
}

impl PositionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the key was already present.
    pub fn insert(&mut self, node: PositionedNode) -> bool {
        if let Some(&slot) = self.index.get(&node.key) {
            self.nodes[slot] = node;
            self.collisions += 1;
            true
        } else {
            self.index.insert(node.key.clone(), self.nodes.len());
            self.nodes.push(node);
            false
        }
    }

    pub fn get(&self, key: &LayoutKey) -> Option<&PositionedNode> {
        self.index.get(key).map(|&slot| &self.nodes[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PositionedNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of inserts that landed on an existing key.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Bounding box of all node centers.
    pub fn bounds(&self) -> Option<Rect> {
        let mut nodes = self.nodes.iter();
        let first = nodes.next()?;
        let start = Rect::from_points(first.center, first.center);
        Some(nodes.fold(start, |acc, node| acc.union_pt(node.center)))
    }
}

/// `0` for an absent node, otherwise one more than the taller child.
pub fn binary_height(node: Option<&BinaryNode>) -> u32 {
    match node {
        None => 0,
        Some(node) => {
            1 + binary_height(node.left.as_deref()).max(binary_height(node.right.as_deref()))
        }
    }
}

/// Lays out a binary snapshot. Each node's children sit `2^(h-1)` units to
/// either side, where `h` is the height of the subtree rooted at the node.
pub fn binary_positions(
    root: &BinaryNode,
    level: u32,
    center_x: f64,
    config: &LayoutConfig,
) -> PositionMap {
    let mut positions = PositionMap::new();
    place_binary(root, level, center_x, config, &mut positions);
    positions
}

fn place_binary(
    node: &BinaryNode,
    level: u32,
    x: f64,
    config: &LayoutConfig,
    positions: &mut PositionMap,
) {
    let key = LayoutKey::binary(node);
    if positions.insert(PositionedNode {
        key: key.clone(),
        center: Point::new(x, config.level_y(level)),
        level,
        values: vec![node.value],
    }) {
        tracing::warn!(%key, level, "duplicate layout key in binary snapshot");
    }

    let height = binary_height(Some(node));
    let offset = 2f64.powi(height as i32 - 1) * config.binary_unit;

    if let Some(left) = node.left.as_deref() {
        place_binary(left, level + 1, x - offset, config, positions);
    }
    if let Some(right) = node.right.as_deref() {
        place_binary(right, level + 1, x + offset, config, positions);
    }
}

/// Lays out an m-ary snapshot. Present children are spread evenly across a
/// span of `2 * unit` per child, centered under the parent, whatever their
/// own value counts.
pub fn mary_positions(
    root: &MaryNode,
    level: u32,
    center_x: f64,
    config: &LayoutConfig,
) -> PositionMap {
    let mut positions = PositionMap::new();
    place_mary(root, level, center_x, config, &mut positions);
    positions
}

fn place_mary(
    node: &MaryNode,
    level: u32,
    x: f64,
    config: &LayoutConfig,
    positions: &mut PositionMap,
) {
    let key = LayoutKey::mary(node);
    if positions.insert(PositionedNode {
        key: key.clone(),
        center: Point::new(x, config.level_y(level)),
        level,
        values: node.values.clone(),
    }) {
        tracing::warn!(%key, level, "duplicate layout key in m-ary snapshot");
    }

    if node.is_leaf() {
        return;
    }

    let present = node.present_children().count();
    let span = present as f64 * config.mary_unit * 2.0;
    let mut child_x = x - span / 2.0 + config.mary_unit;
    for child in node.present_children() {
        place_mary(child, level + 1, child_x, config, positions);
        child_x += config.mary_unit * 2.0;
    }
}

/// Dispatches on the snapshot shape.
pub fn snapshot_positions(snapshot: &Snapshot, center_x: f64, config: &LayoutConfig) -> PositionMap {
    match snapshot {
        Snapshot::Binary(root) => binary_positions(root, 0, center_x, config),
        Snapshot::Mary(root) => mary_positions(root, 0, center_x, config),
    }
}
