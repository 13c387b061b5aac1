//! Semantic matcher.
//!
//! Matching is a depth-first backtracking search written as nested lazy
//! iterators: every choice point (which child a commutative element takes,
//! how long a sequence run is, which extraction an extractor yields) is a
//! `flat_map` over its alternatives. Nothing past the first solution is
//! computed unless the consumer keeps pulling.
//!
//! # Strategies
//!
//! | Strategy | Alignment |
//! |----------|-----------|
//! | `Fixed` | positional, `n == m` |
//! | `Commutative` | every bijection of pattern elements onto children |
//! | `CommutativeSeq` | injection of the fixed elements, leftovers bound to the sequence variable |
//! | `Segmented` | ordered split of the children around sequence variables |
//!
//! Commutative matching enumerates up to `m! / (m - k)!` assignments and
//! segmentation up to `O(m^s)` splits for `s` sequence variables. Neither is
//! bounded; rule authors keep commutative patterns small.

use std::sync::Arc;

use smallvec::SmallVec;

use super::compile::{CompoundPattern, ExtractPattern, MatchStrategy, Pattern, SeqVar};
use super::substitution::Substitution;
use crate::Expr;

/// Lazy sequence of alternative substitutions.
pub type Matches<'a> = Box<dyn Iterator<Item = Substitution> + 'a>;

type Children = Arc<[Arc<Expr>]>;
type Remaining = SmallVec<[usize; 8]>;

fn none<'a>() -> Matches<'a> {
    Box::new(std::iter::empty())
}

fn one<'a>(sub: Substitution) -> Matches<'a> {
    Box::new(std::iter::once(sub))
}

/// Unify `pattern` with `expr`, extending `sub`.
///
/// The returned iterator owns everything it needs from `expr` and `sub`; it
/// only borrows the pattern.
pub fn unify<'a>(pattern: &'a Pattern, expr: &Arc<Expr>, sub: Substitution) -> Matches<'a> {
    match pattern {
        Pattern::Ground(g) => {
            if Arc::ptr_eq(g, expr) || **g == **expr {
                one(sub)
            } else {
                none()
            }
        }
        Pattern::Var(name) => match sub.bind_var(name, expr.clone()) {
            Some(sub) => one(sub),
            None => none(),
        },
        // Rejected at compile time; never matches a single expression.
        Pattern::Seq(_) => none(),
        Pattern::Compound(cp) => unify_compound(cp, expr, sub),
        Pattern::Extract(ep) => unify_extract(ep, expr, sub),
    }
}

/// All substitutions under which `pattern` matches `expr`.
pub fn match_pattern<'a>(pattern: &'a Pattern, expr: &Arc<Expr>) -> Matches<'a> {
    unify(pattern, expr, Substitution::empty())
}

impl Pattern {
    pub fn match_expr<'a>(&'a self, expr: &Arc<Expr>) -> Matches<'a> {
        match_pattern(self, expr)
    }

    /// First substitution in enumeration order.
    pub fn match_first(&self, expr: &Arc<Expr>) -> Option<Substitution> {
        self.match_expr(expr).next()
    }

    pub fn matches(&self, expr: &Arc<Expr>) -> bool {
        self.match_first(expr).is_some()
    }
}

fn unify_compound<'a>(cp: &'a CompoundPattern, expr: &Arc<Expr>, sub: Substitution) -> Matches<'a> {
    let Some(op) = expr.operator() else {
        return none();
    };
    if op.symbol != cp.op.symbol {
        return none();
    }
    let Some(children) = expr.children_arc() else {
        return none();
    };

    let (n, m) = (cp.children.len(), children.len());
    match &cp.strategy {
        MatchStrategy::Fixed if n == m => unify_positional(&cp.children, children, 0, sub),
        MatchStrategy::Commutative if n == m => {
            let remaining: Remaining = (0..m).collect();
            unify_commutative(&cp.children, children, remaining, sub, None)
        }
        MatchStrategy::CommutativeSeq(sv) if m >= n + sv.min.count() => {
            let remaining: Remaining = (0..m).collect();
            unify_commutative(&cp.children, children, remaining, sub, Some(sv))
        }
        MatchStrategy::Segmented => unify_segments(&cp.children, children, 0, sub),
        _ => none(),
    }
}

fn unify_extract<'a>(ep: &'a ExtractPattern, expr: &Arc<Expr>, sub: Substitution) -> Matches<'a> {
    let args = &ep.args;
    let extractions = ep.extractor.extract(expr, &sub);
    Box::new(extractions.filter(move |values| values.len() == args.len()).flat_map(move |values| {
        let values: Children = values.into_iter().collect();
        unify_positional(args, values, 0, sub.clone())
    }))
}

/// Patterns and `children[offset..]` have equal length.
fn unify_positional<'a>(patterns: &'a [Pattern], children: Children, offset: usize, sub: Substitution) -> Matches<'a> {
    let Some((head, tail)) = patterns.split_first() else {
        return one(sub);
    };
    let child = children[offset].clone();
    Box::new(unify(head, &child, sub).flat_map(move |s| unify_positional(tail, children.clone(), offset + 1, s)))
}

/// Assign each pattern element a distinct child from `remaining`.
///
/// Elements are placed in pattern order and each tries the remaining
/// children in their original order. With `rest`, the children left over
/// once every element is placed form the run of the sequence variable, in
/// their original relative order.
fn unify_commutative<'a>(
    patterns: &'a [Pattern],
    children: Children,
    remaining: Remaining,
    sub: Substitution,
    rest: Option<&'a SeqVar>,
) -> Matches<'a> {
    let Some((head, tail)) = patterns.split_first() else {
        return match rest {
            None if remaining.is_empty() => one(sub),
            None => none(),
            Some(sv) if remaining.len() >= sv.min.count() => {
                match sub.bind_seq(&sv.name, remaining.iter().map(|&i| children[i].clone())) {
                    Some(sub) => one(sub),
                    None => none(),
                }
            }
            Some(_) => none(),
        };
    };

    Box::new((0..remaining.len()).flat_map(move |slot| {
        let child = children[remaining[slot]].clone();
        let mut next = remaining.clone();
        next.remove(slot);
        let children = children.clone();
        unify(head, &child, sub.clone())
            .flat_map(move |s| unify_commutative(tail, children.clone(), next.clone(), s, rest))
    }))
}

/// Left-to-right segmentation of `children[offset..]`.
///
/// A sequence variable tries run lengths in ascending order, from its
/// minimum up to what the remaining elements leave free. When no sequence
/// variable follows, the length is forced.
fn unify_segments<'a>(patterns: &'a [Pattern], children: Children, offset: usize, sub: Substitution) -> Matches<'a> {
    let available = children.len() - offset;
    let Some((head, tail)) = patterns.split_first() else {
        return if available == 0 { one(sub) } else { none() };
    };

    let reserved: usize = tail.iter().map(Pattern::min_width).sum();
    if available < reserved + head.min_width() {
        return none();
    }

    match head {
        Pattern::Seq(sv) => {
            let max = available - reserved;
            let min = if tail.iter().any(Pattern::is_seq) { sv.min.count() } else { max };
            Box::new((min..=max).flat_map(move |len| {
                let bound = sub.bind_seq(&sv.name, children[offset..offset + len].iter().cloned());
                let children = children.clone();
                bound.into_iter().flat_map(move |s| unify_segments(tail, children.clone(), offset + len, s))
            }))
        }
        _ => {
            let child = children[offset].clone();
            Box::new(unify(head, &child, sub).flat_map(move |s| unify_segments(tail, children.clone(), offset + 1, s)))
        }
    }
}
