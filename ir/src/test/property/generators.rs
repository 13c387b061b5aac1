//! Generators for property-based testing.
//!
//! Expressions are built over the fixture registry
//! ([`fixtures::registry`](crate::test::fixtures::registry)).

use std::sync::Arc;

use proptest::prelude::*;

use crate::test::fixtures::apply;
use crate::{ConstValue, Expr};

// ============================================================================
// Leaf Generators
// ============================================================================

/// Small integer literal, zero included.
pub fn arb_small_int() -> impl Strategy<Value = Arc<Expr>> {
    (-3i64..=3).prop_map(Expr::int)
}

/// Symbolic variable from a small alphabet.
pub fn arb_variable() -> impl Strategy<Value = Arc<Expr>> {
    prop::sample::select(vec!["x", "y", "z"]).prop_map(Expr::variable)
}

/// Literal value with reasonable bounds.
pub fn arb_const_value() -> impl Strategy<Value = ConstValue> {
    prop_oneof![
        (-100i64..=100).prop_map(ConstValue::Int),
        (-10.0..=10.0).prop_map(ConstValue::Float),
        any::<bool>().prop_map(ConstValue::Bool),
    ]
}

pub fn arb_leaf() -> impl Strategy<Value = Arc<Expr>> {
    prop_oneof![3 => arb_small_int(), 2 => arb_variable(), 1 => arb_const_value().prop_map(Expr::literal)]
}

// ============================================================================
// Tree Generators
// ============================================================================

/// Expression tree over `+`, `*`, `°` and `f` with up to 4 children per node.
pub fn arb_expr() -> impl Strategy<Value = Arc<Expr>> {
    arb_leaf().prop_recursive(4, 32, 4, |inner| {
        (prop::sample::select(vec!["+", "*", "°", "f"]), prop::collection::vec(inner, 0..=4))
            .prop_map(|(op, children)| apply(op, children))
    })
}

/// Children for a commutative sum: integers and variables.
pub fn arb_sum_children(max_len: usize) -> impl Strategy<Value = Vec<Arc<Expr>>> {
    prop::collection::vec(prop_oneof![3 => arb_small_int(), 1 => arb_variable()], 0..=max_len)
}

/// Children together with a permutation of them.
pub fn arb_permuted_children(max_len: usize) -> impl Strategy<Value = (Vec<Arc<Expr>>, Vec<Arc<Expr>>)> {
    arb_sum_children(max_len).prop_flat_map(|children| {
        let original = children.clone();
        Just(children).prop_shuffle().prop_map(move |shuffled| (original.clone(), shuffled))
    })
}

/// Integer sequence without duplicates, for ordering rules.
pub fn arb_distinct_ints(max_len: usize) -> impl Strategy<Value = Vec<i64>> {
    prop::collection::btree_set(-50i64..50, 0..=max_len).prop_map(|set| set.into_iter().collect())
}
