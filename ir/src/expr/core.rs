//! Core `Expr` node and fundamental operations.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::symbol::{Operator, Symbol};
use crate::types::ConstValue;

/// Shape of an expression node.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Atomic numeric or structural constant.
    Literal(ConstValue),
    /// Symbolic placeholder that survives into results (not a pattern variable).
    Variable(Symbol),
    /// Operator application. Properties travel with the operator record.
    Compound { op: Arc<Operator>, children: Arc<[Arc<Expr>]> },
}

/// Immutable expression node.
///
/// Nodes are created through hash consing (see [`hash_consing`](super::hash_consing)),
/// so a structurally identical node built from the same operator records is the
/// same allocation. Trees are never mutated; rewriting builds new nodes and
/// shares unchanged subtrees.
#[derive(derive_more::Debug)]
pub struct Expr {
    /// Unique stable ID, never reused.
    pub id: u64,
    pub(crate) kind: ExprKind,
    /// Lazily computed structural hash.
    #[debug(skip)]
    pub(crate) content_hash_cache: std::sync::OnceLock<u64>,
    /// Normal-form tag: id of the rule set under which this node is known to
    /// be in normal form, or 0.
    #[debug(skip)]
    pub(crate) normal_form: AtomicU64,
}

impl Expr {
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Children of a compound, empty for leaves.
    pub fn children(&self) -> &[Arc<Expr>] {
        match &self.kind {
            ExprKind::Compound { children, .. } => children,
            _ => &[],
        }
    }

    /// Shared handle to the child list of a compound.
    pub(crate) fn children_arc(&self) -> Option<Arc<[Arc<Expr>]>> {
        match &self.kind {
            ExprKind::Compound { children, .. } => Some(children.clone()),
            _ => None,
        }
    }

    pub fn operator(&self) -> Option<&Arc<Operator>> {
        match &self.kind {
            ExprKind::Compound { op, .. } => Some(op),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&ConstValue> {
        match &self.kind {
            ExprKind::Literal(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Symbol> {
        match &self.kind {
            ExprKind::Variable(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self.kind, ExprKind::Compound { .. })
    }

    /// True if this is a compound headed by the symbol `name`.
    pub fn is_application_of(&self, name: &str) -> bool {
        self.operator().is_some_and(|op| op.name() == name)
    }

    /// Numeric literal value, if any.
    pub fn as_number(&self) -> Option<&ConstValue> {
        self.as_literal().filter(|v| v.is_number())
    }

    /// Rebuild a compound with new children, keeping the operator.
    ///
    /// Leaves are returned unchanged. If every child is pointer-equal to the
    /// current one, the node itself is returned.
    pub fn with_children(self: &Arc<Self>, children: impl IntoIterator<Item = Arc<Expr>>) -> Arc<Self> {
        let ExprKind::Compound { op, children: current } = &self.kind else {
            return self.clone();
        };
        let children: Vec<Arc<Expr>> = children.into_iter().collect();
        if children.len() == current.len() && children.iter().zip(current.iter()).all(|(a, b)| Arc::ptr_eq(a, b)) {
            return self.clone();
        }
        Expr::compound(op, children)
    }

    /// Number of nodes in the tree (shared subtrees counted per occurrence).
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(|c| c.size()).sum::<usize>()
    }

    /// Height of the tree; leaves have depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Structural hash, stable for structurally equal trees within a process.
    pub fn content_hash(&self) -> u64 {
        *self.content_hash_cache.get_or_init(|| {
            let mut hasher = DefaultHasher::new();
            match &self.kind {
                ExprKind::Literal(v) => {
                    0u8.hash(&mut hasher);
                    v.hash(&mut hasher);
                }
                ExprKind::Variable(name) => {
                    1u8.hash(&mut hasher);
                    name.hash(&mut hasher);
                }
                ExprKind::Compound { op, children } => {
                    2u8.hash(&mut hasher);
                    op.symbol.hash(&mut hasher);
                    children.len().hash(&mut hasher);
                    for child in children.iter() {
                        child.content_hash().hash(&mut hasher);
                    }
                }
            }
            hasher.finish()
        })
    }

    /// True if this node was certified as normal under rule set `rule_set_id`.
    pub fn is_normal_under(&self, rule_set_id: u64) -> bool {
        rule_set_id != 0 && self.normal_form.load(Ordering::Acquire) == rule_set_id
    }

    /// Record that no rule of rule set `rule_set_id` applies at or below this node.
    pub(crate) fn mark_normal(&self, rule_set_id: u64) {
        self.normal_form.store(rule_set_id, Ordering::Release);
    }

    /// Render as an ASCII tree (see [`tree`](super::tree)).
    pub fn tree(self: &Arc<Self>) -> String {
        super::tree::render_tree(self)
    }
}

/// Structural equality: same literal, same variable name, or same operator
/// symbol with pairwise equal children.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) || self.id == other.id {
            return true;
        }
        match (&self.kind, &other.kind) {
            (ExprKind::Literal(a), ExprKind::Literal(b)) => a == b,
            (ExprKind::Variable(a), ExprKind::Variable(b)) => a == b,
            (ExprKind::Compound { op: op_a, children: a }, ExprKind::Compound { op: op_b, children: b }) => {
                op_a.symbol == op_b.symbol
                    && a.len() == b.len()
                    && self.content_hash() == other.content_hash()
                    && a.iter().zip(b.iter()).all(|(x, y)| Arc::ptr_eq(x, y) || **x == **y)
            }
            _ => false,
        }
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.content_hash().hash(state);
    }
}
