#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use treescope::model::{
    BinaryNode, Count, MaryNode, MirrorView, Mutation, Snapshot, TraversalKind, TreeInfo, TreeKind,
};
use treescope::service::{ServiceError, TreeService};
use treescope::worker::{perform, Request};
use treescope::AppState;

#[derive(Default)]
struct State {
    values: HashMap<TreeKind, Vec<i64>>,
    degree: u32,
    fail_structure: bool,
    fail_mutation: bool,
    calls: Vec<String>,
}

/// In-memory stand-in for the tree service. Binary trees are plain search
/// trees built in insertion order; the m-ary tree keeps every value in the
/// root. Clones share state, so a test can keep a handle while a worker owns
/// another.
#[derive(Clone, Default)]
pub struct FakeTreeService {
    state: Arc<Mutex<State>>,
}

impl FakeTreeService {
    pub fn new() -> Self {
        let service = Self::default();
        service.state.lock().unwrap().degree = 3;
        service
    }

    pub fn with_values(self, kind: TreeKind, values: &[i64]) -> Self {
        self.state
            .lock()
            .unwrap()
            .values
            .insert(kind, values.to_vec());
        self
    }

    pub fn set_fail_structure(&self, fail: bool) {
        self.state.lock().unwrap().fail_structure = fail;
    }

    pub fn set_fail_mutation(&self, fail: bool) {
        self.state.lock().unwrap().fail_mutation = fail;
    }

    /// Calls made so far, e.g. `"structure abb"` or `"mutate abb Insert(5)"`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut self.state.lock().unwrap().calls)
    }

    fn record(&self, call: String) -> std::sync::MutexGuard<'_, State> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

fn insert(node: &mut BinaryNode, value: i64) {
    let slot = if value < node.value {
        &mut node.left
    } else {
        &mut node.right
    };
    if slot.is_none() {
        *slot = Some(Box::new(BinaryNode::leaf(value)));
    } else if let Some(child) = slot {
        insert(child, value);
    }
}

fn search_tree(values: &[i64]) -> Option<BinaryNode> {
    let (first, rest) = values.split_first()?;
    let mut root = BinaryNode::leaf(*first);
    for value in rest {
        insert(&mut root, *value);
    }
    Some(root)
}

fn mirrored(node: &BinaryNode) -> BinaryNode {
    BinaryNode {
        value: node.value,
        left: node.right.as_deref().map(|n| Box::new(mirrored(n))),
        right: node.left.as_deref().map(|n| Box::new(mirrored(n))),
    }
}

fn height(node: &BinaryNode) -> i64 {
    1 + node.children().map(height).max().unwrap_or(0)
}

fn walk(node: &BinaryNode, traversal: TraversalKind, out: &mut Vec<i64>) {
    match traversal {
        TraversalKind::PreOrder => {
            out.push(node.value);
            node.children().for_each(|c| walk(c, traversal, out));
        }
        TraversalKind::PostOrder => {
            node.children().for_each(|c| walk(c, traversal, out));
            out.push(node.value);
        }
        TraversalKind::InOrder => {
            if let Some(left) = &node.left {
                walk(left, traversal, out);
            }
            out.push(node.value);
            if let Some(right) = &node.right {
                walk(right, traversal, out);
            }
        }
        TraversalKind::BreadthFirst => {
            let mut queue = VecDeque::from([node]);
            while let Some(next) = queue.pop_front() {
                out.push(next.value);
                queue.extend(next.children());
            }
        }
    }
}

impl TreeService for FakeTreeService {
    fn structure(&self, kind: TreeKind) -> Result<Option<Snapshot>, ServiceError> {
        let state = self.record(format!("structure {}", kind.as_str()));
        if state.fail_structure {
            return Err(ServiceError::Status {
                status: 500,
                url: "/estructura".into(),
            });
        }
        let values = state.values.get(&kind).cloned().unwrap_or_default();
        Ok(match kind {
            TreeKind::Mvias if values.is_empty() => None,
            TreeKind::Mvias => {
                let mut sorted = values;
                sorted.sort_unstable();
                let slots = sorted.len() + 1;
                Some(Snapshot::Mary(MaryNode::leaf(sorted, slots)))
            }
            _ => search_tree(&values).map(Snapshot::Binary),
        })
    }

    fn mirror(&self) -> Result<MirrorView, ServiceError> {
        let state = self.record("mirror".into());
        let values = state.values.get(&TreeKind::Abb).cloned().unwrap_or_default();
        Ok(match search_tree(&values) {
            Some(root) => MirrorView {
                snapshot: Some(Snapshot::Binary(mirrored(&root))),
                message: "Espejo generado".into(),
            },
            None => MirrorView {
                snapshot: None,
                message: "El ABB está vacío, no hay espejo para generar".into(),
            },
        })
    }

    fn info(&self, kind: TreeKind) -> Result<TreeInfo, ServiceError> {
        let state = self.record(format!("info {}", kind.as_str()));
        let values = state.values.get(&kind).cloned().unwrap_or_default();
        let height = match kind {
            TreeKind::Mvias => i64::from(!values.is_empty()),
            _ => search_tree(&values).as_ref().map(height).unwrap_or(0),
        };
        Ok(TreeInfo {
            label: kind.label().to_string(),
            height: Count::Number(height),
            node_count: Count::Number(values.len() as i64),
            value_count: Count::Number(values.len() as i64),
            mirror_count: None,
        })
    }

    fn traversal(
        &self,
        kind: TreeKind,
        traversal: TraversalKind,
    ) -> Result<Vec<i64>, ServiceError> {
        let state = self.record(format!("traversal {} {}", kind.as_str(), traversal.as_str()));
        let values = state.values.get(&kind).cloned().unwrap_or_default();
        let mut out = Vec::new();
        if let Some(root) = search_tree(&values) {
            walk(&root, traversal, &mut out);
        }
        Ok(out)
    }

    fn mutate(&self, kind: TreeKind, mutation: Mutation) -> Result<String, ServiceError> {
        let mut state = self.record(format!("mutate {} {:?}", kind.as_str(), mutation));
        if state.fail_mutation {
            return Err(ServiceError::Disconnected);
        }
        let label = kind.label();
        if let Mutation::Configure(m) = mutation {
            state.degree = m;
            state.values.remove(&TreeKind::Mvias);
            return Ok(format!("Árbol M-Vías configurado con m={m}"));
        }

        let values = state.values.entry(kind).or_default();
        Ok(match mutation {
            Mutation::Insert(v) if values.contains(&v) => format!("El valor {v} ya existe"),
            Mutation::Insert(v) => {
                values.push(v);
                format!("Valor {v} insertado en {label}")
            }
            Mutation::Delete(v) => match values.iter().position(|x| *x == v) {
                Some(index) => {
                    values.remove(index);
                    format!("Valor {v} eliminado de {label}")
                }
                None => format!("Valor {v} no encontrado"),
            },
            Mutation::Clear => {
                values.clear();
                format!("{label} limpiado")
            }
            Mutation::Configure(_) => unreachable!(),
        })
    }
}

/// Runs a request and every refresh it releases, synchronously.
pub fn drive(app: &mut AppState, service: &FakeTreeService, request: Option<Request>) {
    let mut next = request;
    while let Some(request) = next {
        next = app.apply_outcome(perform(service, request));
    }
}

pub fn labels(app: &AppState) -> Vec<String> {
    app.scene.labels().map(str::to_string).collect()
}
