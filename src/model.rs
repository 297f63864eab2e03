use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Nesting limit for snapshots, well above any tree the service can send
/// through serde_json's own nesting limit. Conversion and layout recurse
/// per level, so anything deeper is refused at ingestion.
pub const MAX_SNAPSHOT_DEPTH: usize = 512;

/// Separator used when an m-ary node's values are joined into its layout key.
pub const KEY_SEPARATOR: &str = "-";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("binary node at depth {depth} has no value")]
    MissingValue { depth: usize },
    #[error("snapshot is nested deeper than {MAX_SNAPSHOT_DEPTH} levels")]
    TooDeep,
}

/// Tree type selector understood by the tree service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TreeKind {
    #[default]
    Abb,
    Avl,
    Mvias,
}

impl TreeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TreeKind::Abb => "abb",
            TreeKind::Avl => "avl",
            TreeKind::Mvias => "mvias",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TreeKind::Abb => "ABB",
            TreeKind::Avl => "AVL",
            TreeKind::Mvias => "M-Vías",
        }
    }

    pub fn next(self) -> Self {
        match self {
            TreeKind::Abb => TreeKind::Avl,
            TreeKind::Avl => TreeKind::Mvias,
            TreeKind::Mvias => TreeKind::Abb,
        }
    }
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalKind {
    InOrder,
    PreOrder,
    PostOrder,
    BreadthFirst,
}

impl TraversalKind {
    /// Path segment used by the service (`/recorrido/{segment}`).
    pub fn as_str(self) -> &'static str {
        match self {
            TraversalKind::InOrder => "inorden",
            TraversalKind::PreOrder => "preorden",
            TraversalKind::PostOrder => "postorden",
            TraversalKind::BreadthFirst => "amplitud",
        }
    }
}

/// A structural change requested from the tree service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Insert(i64),
    Delete(i64),
    Clear,
    Configure(u32),
}

impl Mutation {
    pub fn describe(&self) -> &'static str {
        match self {
            Mutation::Insert(_) => "insert value",
            Mutation::Delete(_) => "delete value",
            Mutation::Clear => "clear tree",
            Mutation::Configure(_) => "configure M-Vías",
        }
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// A node exactly as the service serializes it. Binary and m-ary nodes share
/// one shape on the wire; the fields that do not apply are simply absent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WireNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valor: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub izquierdo: Option<Box<WireNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hijo_izquierdo: Option<Box<WireNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derecho: Option<Box<WireNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hijo_derecho: Option<Box<WireNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valores: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hijos: Option<Vec<Option<WireNode>>>,
}

impl WireNode {
    fn is_mvias(&self) -> bool {
        self.tipo.as_deref() == Some("mvias")
    }
}

// ---------------------------------------------------------------------------
// Canonical snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryNode {
    pub value: i64,
    pub left: Option<Box<BinaryNode>>,
    pub right: Option<Box<BinaryNode>>,
}

impl BinaryNode {
    pub fn leaf(value: i64) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }

    pub fn with_left(mut self, node: BinaryNode) -> Self {
        self.left = Some(Box::new(node));
        self
    }

    pub fn with_right(mut self, node: BinaryNode) -> Self {
        self.right = Some(Box::new(node));
        self
    }

    /// Present children, left before right.
    pub fn children(&self) -> impl Iterator<Item = &BinaryNode> {
        self.left.iter().chain(self.right.iter()).map(|b| &**b)
    }

    fn from_wire(wire: WireNode, depth: usize) -> Result<Self, SnapshotError> {
        if depth > MAX_SNAPSHOT_DEPTH {
            return Err(SnapshotError::TooDeep);
        }
        let value = wire.valor.ok_or(SnapshotError::MissingValue { depth })?;

        // Current field name first, legacy alias second.
        let left = wire.izquierdo.or(wire.hijo_izquierdo);
        let right = wire.derecho.or(wire.hijo_derecho);

        let left = left
            .map(|w| Self::from_wire(*w, depth + 1).map(Box::new))
            .transpose()?;
        let right = right
            .map(|w| Self::from_wire(*w, depth + 1).map(Box::new))
            .transpose()?;

        Ok(Self { value, left, right })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaryNode {
    pub values: Vec<i64>,
    /// Fixed-size child slots; absent children stay in place as `None`.
    pub children: Vec<Option<MaryNode>>,
}

impl MaryNode {
    pub fn new(values: Vec<i64>, children: Vec<Option<MaryNode>>) -> Self {
        Self { values, children }
    }

    pub fn leaf(values: Vec<i64>, slots: usize) -> Self {
        Self {
            values,
            children: vec![None; slots],
        }
    }

    pub fn present_children(&self) -> impl Iterator<Item = &MaryNode> {
        self.children.iter().flatten()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    fn from_wire(wire: WireNode, depth: usize) -> Result<Self, SnapshotError> {
        if depth > MAX_SNAPSHOT_DEPTH {
            return Err(SnapshotError::TooDeep);
        }
        let children = wire
            .hijos
            .unwrap_or_default()
            .into_iter()
            .map(|slot| slot.map(|w| Self::from_wire(w, depth + 1)).transpose())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            values: wire.valores.unwrap_or_default(),
            children,
        })
    }
}

/// A complete, read-only tree description received from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Binary(BinaryNode),
    Mary(MaryNode),
}

impl Snapshot {
    pub fn from_json(value: serde_json::Value) -> Result<Option<Self>, serde_json::Error> {
        let wire: Option<WireNode> = serde_json::from_value(value)?;
        wire.map(Snapshot::try_from)
            .transpose()
            .map_err(<serde_json::Error as serde::de::Error>::custom)
    }

    pub fn is_mary(&self) -> bool {
        matches!(self, Snapshot::Mary(_))
    }
}

impl TryFrom<WireNode> for Snapshot {
    type Error = SnapshotError;

    fn try_from(wire: WireNode) -> Result<Self, Self::Error> {
        if wire.is_mvias() {
            MaryNode::from_wire(wire, 0).map(Snapshot::Mary)
        } else {
            BinaryNode::from_wire(wire, 0).map(Snapshot::Binary)
        }
    }
}

// ---------------------------------------------------------------------------
// Service payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct StructurePayload {
    #[serde(default)]
    pub arbol: Option<WireNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MirrorPayload {
    #[serde(default)]
    pub arbol: Option<WireNode>,
    #[serde(default)]
    pub mensaje: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagePayload {
    #[serde(default)]
    pub mensaje: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraversalPayload {
    #[serde(default)]
    pub recorrido: Vec<i64>,
}

/// The mirrored view returned by the service, already ingested.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorView {
    pub snapshot: Option<Snapshot>,
    pub message: String,
}

/// A count reported by the service. Some tree types answer with text
/// ("No disponible") instead of a number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Count {
    Number(i64),
    Text(String),
}

impl Default for Count {
    fn default() -> Self {
        Count::Number(0)
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Number(n) => write!(f, "{n}"),
            Count::Text(t) => f.write_str(t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TreeInfo {
    #[serde(rename = "tipo")]
    pub label: String,
    #[serde(rename = "altura", default)]
    pub height: Count,
    #[serde(rename = "cantidad_nodos", default)]
    pub node_count: Count,
    #[serde(rename = "cantidad_valores", default)]
    pub value_count: Count,
    #[serde(rename = "cantidad_espejo", default)]
    pub mirror_count: Option<i64>,
}

impl TreeInfo {
    /// One-line summary shown under the canvas. The service's mirror count
    /// includes a sentinel entry, so it is shown one lower.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} | Altura: {} | Nodos: {} | Valores: {}",
            self.label, self.height, self.node_count, self.value_count
        );
        if let Some(mirrored) = self.mirror_count {
            line.push_str(&format!(" | Nodos Espejo: {}", mirrored - 1));
        }
        line
    }
}

pub fn format_traversal(kind: TraversalKind, values: &[i64]) -> String {
    let joined = values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}: [{}]", kind.as_str(), joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn binary(value: serde_json::Value) -> BinaryNode {
        match Snapshot::from_json(value).unwrap().unwrap() {
            Snapshot::Binary(node) => node,
            other => panic!("expected binary snapshot, got {other:?}"),
        }
    }

    #[test]
    fn test_binary_snapshot_current_names() {
        let node = binary(json!({
            "tipo": "binario",
            "valor": 5,
            "izquierdo": {"tipo": "binario", "valor": 3, "izquierdo": null, "derecho": null},
            "derecho": null
        }));
        assert_eq!(node, BinaryNode::leaf(5).with_left(BinaryNode::leaf(3)));
    }

    #[test]
    fn test_binary_snapshot_legacy_names() {
        let node = binary(json!({
            "valor": 5,
            "hijo_izquierdo": {"valor": 3},
            "hijo_derecho": {"valor": 8}
        }));
        assert_eq!(
            node,
            BinaryNode::leaf(5)
                .with_left(BinaryNode::leaf(3))
                .with_right(BinaryNode::leaf(8))
        );
    }

    #[test]
    fn test_current_name_wins_over_legacy() {
        let node = binary(json!({
            "valor": 5,
            "izquierdo": {"valor": 1},
            "hijo_izquierdo": {"valor": 2}
        }));
        assert_eq!(node.left.as_deref(), Some(&BinaryNode::leaf(1)));
    }

    #[test]
    fn test_null_legacy_falls_back() {
        let node = binary(json!({
            "valor": 5,
            "izquierdo": null,
            "hijo_izquierdo": {"valor": 2}
        }));
        assert_eq!(node.left.as_deref(), Some(&BinaryNode::leaf(2)));
    }

    #[test]
    fn test_null_snapshot_is_none() {
        assert_eq!(Snapshot::from_json(serde_json::Value::Null).unwrap(), None);
    }

    #[test]
    fn test_mvias_tag_dispatch() {
        let snapshot = Snapshot::from_json(json!({
            "tipo": "mvias",
            "valores": [10, 20],
            "hijos": [{"tipo": "mvias", "valores": [5], "hijos": [null, null, null]}, null, null]
        }))
        .unwrap()
        .unwrap();

        let Snapshot::Mary(root) = snapshot else {
            panic!("expected m-ary snapshot");
        };
        assert_eq!(root.values, vec![10, 20]);
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.present_children().count(), 1);
        assert!(!root.is_leaf());
    }

    #[test]
    fn test_shape_comes_from_tag_not_fields() {
        // `valores` without the tag is not enough to become m-ary.
        let result = Snapshot::from_json(json!({"valores": [1, 2]}));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_value_is_reported_with_depth() {
        let wire: WireNode =
            serde_json::from_value(json!({"valor": 1, "derecho": {"izquierdo": null}})).unwrap();
        assert_eq!(
            Snapshot::try_from(wire),
            Err(SnapshotError::MissingValue { depth: 1 })
        );
    }

    #[test]
    fn test_too_deep_snapshot_is_refused() {
        let mut wire = WireNode {
            valor: Some(0),
            ..WireNode::default()
        };
        for v in 1..=(MAX_SNAPSHOT_DEPTH as i64 + 1) {
            wire = WireNode {
                valor: Some(v),
                izquierdo: Some(Box::new(wire)),
                ..WireNode::default()
            };
        }
        assert_eq!(Snapshot::try_from(wire), Err(SnapshotError::TooDeep));
    }

    #[test]
    fn test_deep_degenerate_tree_is_accepted() {
        // Sorted inserts into a search tree give a right spine.
        let mut body = String::new();
        for v in 1..=120 {
            body.push_str(&format!("{{\"valor\": {v}, \"derecho\": "));
        }
        body.push_str("null");
        body.push_str(&"}".repeat(120));

        let wire: WireNode = serde_json::from_str(&body).unwrap();
        let snapshot = Snapshot::try_from(wire).unwrap();
        let Snapshot::Binary(root) = &snapshot else {
            panic!("expected a binary snapshot");
        };
        assert_eq!(crate::layout::binary_height(Some(root)), 120);

        let config = crate::layout::LayoutConfig::default();
        let positions = crate::layout::snapshot_positions(&snapshot, 0.0, &config);
        assert_eq!(positions.len(), 120);
    }

    #[test]
    fn test_info_summary_with_mirror_adjustment() {
        let info: TreeInfo = serde_json::from_value(json!({
            "tipo": "ABB",
            "altura": 3,
            "cantidad_nodos": 7,
            "cantidad_valores": 7,
            "cantidad_espejo": 6
        }))
        .unwrap();
        assert_eq!(
            info.summary(),
            "ABB | Altura: 3 | Nodos: 7 | Valores: 7 | Nodos Espejo: 5"
        );
    }

    #[test]
    fn test_info_summary_with_text_count() {
        let info: TreeInfo = serde_json::from_value(json!({
            "tipo": "AVL",
            "altura": 0,
            "cantidad_nodos": "No disponible",
            "cantidad_valores": 0
        }))
        .unwrap();
        assert_eq!(
            info.summary(),
            "AVL | Altura: 0 | Nodos: No disponible | Valores: 0"
        );
    }

    #[test]
    fn test_tree_kind_cycle() {
        assert_eq!(TreeKind::Abb.next(), TreeKind::Avl);
        assert_eq!(TreeKind::Avl.next(), TreeKind::Mvias);
        assert_eq!(TreeKind::Mvias.next(), TreeKind::Abb);
        assert_eq!(TreeKind::Mvias.as_str(), "mvias");
    }

    #[test]
    fn test_format_traversal() {
        assert_eq!(
            format_traversal(TraversalKind::InOrder, &[1, 2, 3]),
            "inorden: [1, 2, 3]"
        );
        assert_eq!(format_traversal(TraversalKind::BreadthFirst, &[]), "amplitud: []");
    }
}
