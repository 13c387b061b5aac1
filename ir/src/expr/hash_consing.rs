//! Hash consing for `Expr` nodes.
//!
//! Structurally identical nodes share one allocation, so most equality
//! checks made by the matcher reduce to `Arc::ptr_eq`, and memo tables keyed
//! by node id see DAG-shared subtrees once.
//!
//! The cache is a global lock-free papaya map from node key to `Weak<Expr>`.
//! Nodes die when the last strong reference is dropped; dead entries are
//! replaced on the next insert of the same key or purged by [`gc_dead_refs`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use papaya::HashMap;
use smallvec::SmallVec;

use crate::expr::core::{Expr, ExprKind};
use crate::symbol::{Operator, Symbol};
use crate::types::ConstValue;

// Starts at 1: id 0 is never handed out.
static EXPR_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_expr_id() -> u64 {
    EXPR_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Cache key. Children are identified by stable id; the operator record by
/// address, since two records for the same symbol may carry different
/// properties.
#[derive(Eq, PartialEq, Hash, Clone)]
enum ConsKey {
    Literal(ConstValue),
    Variable(Symbol),
    Compound { op: usize, child_ids: SmallVec<[u64; 4]> },
}

impl ConsKey {
    fn new(kind: &ExprKind) -> Self {
        match kind {
            ExprKind::Literal(v) => ConsKey::Literal(v.clone()),
            ExprKind::Variable(name) => ConsKey::Variable(name.clone()),
            ExprKind::Compound { op, children } => ConsKey::Compound {
                op: Arc::as_ptr(op) as usize,
                child_ids: children.iter().map(|c| c.id).collect(),
            },
        }
    }
}

static EXPRS: OnceLock<HashMap<ConsKey, Weak<Expr>>> = OnceLock::new();

fn exprs() -> &'static HashMap<ConsKey, Weak<Expr>> {
    EXPRS.get_or_init(HashMap::new)
}

/// Remove dead weak references from the cache.
pub fn gc_dead_refs() {
    let map = exprs();
    let guard = map.guard();
    let dead: Vec<ConsKey> =
        map.iter(&guard).filter(|(_, weak)| weak.upgrade().is_none()).map(|(k, _)| k.clone()).collect();
    for key in dead {
        map.remove(&key, &guard);
    }
}

/// Number of cached nodes that are still alive.
pub fn live_expr_count() -> usize {
    let map = exprs();
    let guard = map.guard();
    map.iter(&guard).filter(|(_, weak)| weak.upgrade().is_some()).count()
}

/// True if the cache holds an entry for `kind`, dead or alive.
#[cfg(test)]
pub(crate) fn has_cache_entry(kind: &ExprKind) -> bool {
    let map = exprs();
    let guard = map.guard();
    map.get(&ConsKey::new(kind), &guard).is_some()
}

impl Expr {
    /// Intern a node.
    ///
    /// Returns the existing node if a live structurally identical one exists
    /// (in any thread), otherwise allocates and caches a new one.
    pub(crate) fn intern(kind: ExprKind) -> Arc<Self> {
        use papaya::{Compute, Operation};

        let key = ConsKey::new(&kind);
        let guard = exprs().guard();

        if let Some(weak) = exprs().get(&key, &guard)
            && let Some(arc) = weak.upgrade()
        {
            return arc;
        }

        let new_arc = Arc::new(Self {
            id: next_expr_id(),
            kind,
            content_hash_cache: OnceLock::new(),
            normal_form: AtomicU64::new(0),
        });
        let new_weak = Arc::downgrade(&new_arc);

        let result = exprs().compute(
            key,
            |entry| match entry {
                Some((_, existing)) => match existing.upgrade() {
                    Some(existing) => Operation::Abort(existing),
                    None => Operation::Insert(new_weak.clone()),
                },
                None => Operation::Insert(new_weak.clone()),
            },
            &guard,
        );

        match result {
            Compute::Aborted(existing) => existing,
            _ => new_arc,
        }
    }

    /// Literal leaf.
    pub fn literal(value: impl Into<ConstValue>) -> Arc<Self> {
        Self::intern(ExprKind::Literal(value.into()))
    }

    pub fn int(value: i64) -> Arc<Self> {
        Self::literal(ConstValue::Int(value))
    }

    pub fn float(value: f64) -> Arc<Self> {
        Self::literal(ConstValue::Float(value))
    }

    pub fn bool(value: bool) -> Arc<Self> {
        Self::literal(ConstValue::Bool(value))
    }

    /// Symbolic variable leaf.
    pub fn variable(name: impl Into<Symbol>) -> Arc<Self> {
        Self::intern(ExprKind::Variable(name.into()))
    }

    /// Operator application.
    pub fn compound(op: &Arc<Operator>, children: impl IntoIterator<Item = Arc<Expr>>) -> Arc<Self> {
        let children: Arc<[Arc<Expr>]> = children.into_iter().collect();
        Self::intern(ExprKind::Compound { op: op.clone(), children })
    }
}
