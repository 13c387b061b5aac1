//! Standard algebraic rules and rule sets.
//!
//! Rule families are derived from operator properties: an operator's
//! identity yields identity removal, associativity yields flattening, the
//! numeric function in its exec handle yields constant folding. Asking for a
//! family the operator does not support is a construction error.
//!
//! # Rule sets
//!
//! - [`plus_cleanup`] - zero removal and collapse of `(+ x)` / `(+)`
//! - [`simplify`] - flattening, folding, identities and annihilators for the
//!   standard operators

use std::sync::Arc;

use kestrel_ir::pattern::numeric_gt;
use kestrel_ir::prelude::*;
use snafu::ensure;
use tracing::trace;

use crate::error::{NoIdentitySnafu, NoNumericFnSnafu, NotAssociativeSnafu, Result};
use crate::exec::NumericFn;
use crate::extractors::NEG;

fn build(
    registry: &Registry,
    name: impl Into<String>,
    pattern: PatternSpec,
    transform: impl Into<TransformSpec>,
    guard: Option<GuardSpec>,
) -> Result<Rule> {
    Ok(Rule::builder(registry).name(name).pattern(pattern).transform(transform).maybe_guard(guard).build()?)
}

// ============================================================================
// Addition cleanup
// ============================================================================

/// `(+ (zero? ?z) ?&*rest) -> (+ ?&*rest)`
pub fn remove_zero(registry: &Registry) -> Result<Rule> {
    build(
        registry,
        "remove_zero",
        app("+", [app("zero?", [var("z")]), seq0("rest")]),
        app("+", [seq0("rest")]),
        None,
    )
}

/// `(+ ?x) -> ?x`
pub fn remove_unary_plus(registry: &Registry) -> Result<Rule> {
    collapse_unary_named(registry, "+", "remove_unary_plus")
}

/// `(+) -> 0`
pub fn remove_nullary_plus(registry: &Registry) -> Result<Rule> {
    collapse_nullary_named(registry, "+", "remove_nullary_plus")
}

// ============================================================================
// Property-derived families
// ============================================================================

/// `(op ?x) -> ?x` for an associative `op`.
pub fn collapse_unary(registry: &Registry, op: &str) -> Result<Rule> {
    collapse_unary_named(registry, op, format!("collapse_unary({op})"))
}

fn collapse_unary_named(registry: &Registry, op: &str, name: impl Into<String>) -> Result<Rule> {
    let operator = registry.operator(op)?;
    ensure!(operator.props.associative, NotAssociativeSnafu { op });
    build(registry, name, app(op, [var("x")]), var("x"), None)
}

/// `(op) -> identity`.
pub fn collapse_nullary(registry: &Registry, op: &str) -> Result<Rule> {
    collapse_nullary_named(registry, op, format!("collapse_nullary({op})"))
}

fn collapse_nullary_named(registry: &Registry, op: &str, name: impl Into<String>) -> Result<Rule> {
    let operator = registry.operator(op)?;
    let Some(identity) = operator.props.identity.clone() else {
        return NoIdentitySnafu { op }.fail();
    };
    build(registry, name, app(op, Vec::new()), ground(identity), None)
}

/// Drop one occurrence of `op`'s identity element.
///
/// Commutative: `(op id ?&*rest) -> (op ?&*rest)`.
/// Otherwise: `(op ?&*a id ?&*b) -> (op ?&*a ?&*b)`.
///
/// The identity is matched structurally: for `+` with identity `0` this
/// removes the integer `0` but not `0.0`. [`remove_zero`] and [`remove_one`]
/// match semantically instead.
pub fn remove_identity(registry: &Registry, op: &str) -> Result<Rule> {
    let operator = registry.operator(op)?;
    let Some(identity) = operator.props.identity.clone() else {
        return NoIdentitySnafu { op }.fail();
    };
    let name = format!("remove_identity({op})");
    if operator.is_commutative() {
        build(registry, name, app(op, [ground(identity), seq0("rest")]), app(op, [seq0("rest")]), None)
    } else {
        build(
            registry,
            name,
            app(op, [seq0("a"), ground(identity), seq0("b")]),
            app(op, [seq0("a"), seq0("b")]),
            None,
        )
    }
}

/// Splice a nested application of an associative `op` into its parent.
///
/// Commutative: `(op (op ?&*inner) ?&*rest) -> (op ?&*inner ?&*rest)`.
/// Otherwise the nested child keeps its position:
/// `(op ?&*a (op ?&*inner) ?&*b) -> (op ?&*a ?&*inner ?&*b)`.
pub fn flatten_associative(registry: &Registry, op: &str) -> Result<Rule> {
    let operator = registry.operator(op)?;
    ensure!(operator.props.associative, NotAssociativeSnafu { op });
    let name = format!("flatten_associative({op})");
    let nested = app(op, [seq0("inner")]);
    if operator.is_commutative() {
        build(registry, name, app(op, [nested, seq0("rest")]), app(op, [seq0("inner"), seq0("rest")]), None)
    } else {
        build(
            registry,
            name,
            app(op, [seq0("a"), nested, seq0("b")]),
            app(op, [seq0("a"), seq0("inner"), seq0("b")]),
            None,
        )
    }
}

/// Evaluate numeric literal arguments through `op`'s [`NumericFn`].
///
/// - Unary function: `(op (number? ?a)) -> value`.
/// - Commutative fold: any two numbers combine, the result goes first:
///   `(op (number? ?a) (number? ?b) ?&*rest) -> (op value ?&*rest)`.
/// - Positional fold: two adjacent numbers combine in place.
///
/// A pair the function is undefined on (overflow, non-finite result) is
/// skipped and the next candidate pair is tried.
pub fn fold_constants(registry: &Registry, op: &str) -> Result<Rule> {
    let operator = registry.operator(op)?;
    let Some(numeric) = NumericFn::of(&operator) else {
        return NoNumericFnSnafu { op }.fail();
    };
    let name = format!("fold_constants({op})");
    let number = |v: &str| app("number?", [var(v)]);

    if !numeric.is_fold() {
        let eval = TransformSpec::func(["a"], move |sub| {
            let a = sub.expr("a")?.as_number()?;
            numeric.eval(std::slice::from_ref(a)).map(Expr::literal)
        });
        return build(registry, name, app(op, [number("a")]), eval, None);
    }

    let combine = move |sub: &Substitution| -> Option<Arc<Expr>> {
        let a = sub.expr("a")?.as_number()?.clone();
        let b = sub.expr("b")?.as_number()?.clone();
        let value = numeric.eval(&[a, b]);
        if value.is_none() {
            trace!(%sub, "numeric function undefined");
        }
        value.map(Expr::literal)
    };

    if operator.is_commutative() {
        let op_ref = operator.clone();
        let eval = TransformSpec::func(["a", "b", "rest"], move |sub| {
            let value = combine(sub)?;
            let rest = sub.run("rest")?;
            Some(Expr::compound(&op_ref, std::iter::once(value).chain(rest.iter().cloned())))
        });
        build(registry, name, app(op, [number("a"), number("b"), seq0("rest")]), eval, None)
    } else {
        let op_ref = operator.clone();
        let eval = TransformSpec::func(["pre", "a", "b", "post"], move |sub| {
            let value = combine(sub)?;
            let (pre, post) = (sub.run("pre")?, sub.run("post")?);
            let children = pre.iter().cloned().chain(std::iter::once(value)).chain(post.iter().cloned());
            Some(Expr::compound(&op_ref, children))
        });
        build(registry, name, app(op, [seq0("pre"), number("a"), number("b"), seq0("post")]), eval, None)
    }
}

/// Swap an out-of-order pair of numeric children of a positional `op`:
/// `(op ?&*a ?x ?&*b ?y ?&*c) -> (op ?&*a ?y ?&*b ?x ?&*c)` when `?y > ?x`.
///
/// Each firing removes at least one inversion, so the rule terminates with
/// the numeric children in descending order. Non-numeric children never
/// move. Commutative operators are rejected by pattern compilation (more
/// than one sequence variable).
pub fn sort_descending(registry: &Registry, op: &str) -> Result<Rule> {
    let guard = GuardSpec::new(["x", "y"], |sub| match (sub.expr("x"), sub.expr("y")) {
        (Some(x), Some(y)) => numeric_gt(y, x),
        _ => false,
    });
    build(
        registry,
        format!("sort_descending({op})"),
        app(op, [seq0("a"), var("x"), seq0("b"), var("y"), seq0("c")]),
        app(op, [seq0("a"), var("y"), seq0("b"), var("x"), seq0("c")]),
        Some(guard),
    )
}

// ============================================================================
// Multiplication and negation
// ============================================================================

/// `(* (one? ?o) ?&*rest) -> (* ?&*rest)`
pub fn remove_one(registry: &Registry) -> Result<Rule> {
    build(
        registry,
        "remove_one",
        app("*", [app("one?", [var("o")]), seq0("rest")]),
        app("*", [seq0("rest")]),
        None,
    )
}

/// `(* (zero? ?z) ?&*rest) -> ?z`
pub fn annihilate_zero(registry: &Registry) -> Result<Rule> {
    build(registry, "annihilate_zero", app("*", [app("zero?", [var("z")]), seq0("rest")]), var("z"), None)
}

/// `(- (neg? ?x)) -> ?x`, which also covers `(- -3) -> 3`.
pub fn double_negation(registry: &Registry) -> Result<Rule> {
    build(registry, "double_negation", app(NEG, [app("neg?", [var("x")])]), var("x"), None)
}

// ============================================================================
// Rule sets
// ============================================================================

pub fn plus_cleanup(registry: &Registry) -> Result<RuleSet> {
    Ok(RuleSet::new(
        "plus_cleanup",
        [remove_zero(registry)?, remove_unary_plus(registry)?, remove_nullary_plus(registry)?],
    ))
}

/// Algebraic simplification over the standard operators.
///
/// Order: flatten first so folding sees every constant of a sum or product,
/// then fold, then drop identities and collapse trivial applications.
pub fn simplify(registry: &Registry) -> Result<RuleSet> {
    let rules = vec![
        flatten_associative(registry, "+")?,
        flatten_associative(registry, "*")?,
        fold_constants(registry, "+")?,
        fold_constants(registry, "*")?,
        fold_constants(registry, NEG)?,
        fold_constants(registry, "inc")?,
        fold_constants(registry, "sin")?,
        double_negation(registry)?,
        annihilate_zero(registry)?,
        remove_zero(registry)?,
        remove_one(registry)?,
        remove_unary_plus(registry)?,
        collapse_unary(registry, "*")?,
        remove_nullary_plus(registry)?,
        collapse_nullary(registry, "*")?,
    ];
    Ok(RuleSet::new("simplify", rules))
}
