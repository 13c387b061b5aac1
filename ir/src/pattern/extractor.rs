//! Extractors: named semantic predicates with their own matching relation.
//!
//! An extractor stands in a pattern where syntactic structure would be too
//! narrow. `(zero? ?x)` matches any expression the `zero?` extractor accepts
//! (an integer zero, a float zero, an all-zero matrix) and binds `?x` to it.
//!
//! The relation is multi-valued: [`Extractor::extract`] lazily yields zero or
//! more *extractions*, each a tuple of expressions that the matcher unifies
//! positionally with the extractor's argument patterns. An empty iterator is
//! a match failure.

use std::fmt;
use std::sync::Arc;

use smallvec::{SmallVec, smallvec};

use super::substitution::Substitution;
use crate::Expr;

/// One result of an extractor: the values for its argument patterns.
pub type Extraction = SmallVec<[Arc<Expr>; 2]>;

/// Lazy sequence of extractions.
pub type Extractions<'a> = Box<dyn Iterator<Item = Extraction> + 'a>;

/// A named matching relation usable inside patterns.
pub trait Extractor: Send + Sync {
    /// Registry name, e.g. `zero?`.
    fn name(&self) -> &str;

    /// Number of argument patterns the extractor binds.
    fn arity(&self) -> usize;

    /// Enumerate extractions of `expr` under the current substitution.
    ///
    /// Every yielded extraction must have exactly [`arity`](Self::arity)
    /// elements; the matcher skips malformed ones.
    fn extract<'a>(&'a self, expr: &Arc<Expr>, sub: &Substitution) -> Extractions<'a>;
}

impl fmt::Debug for dyn Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Extractor({}/{})", self.name(), self.arity())
    }
}

type PredicateFn = dyn Fn(&Arc<Expr>) -> bool + Send + Sync;
type RelationFn = dyn Fn(&Arc<Expr>, &Substitution) -> Vec<Extraction> + Send + Sync;

/// Unary extractor built from a boolean test.
///
/// Yields the candidate itself once when the test passes.
pub struct PredicateExtractor {
    name: String,
    test: Arc<PredicateFn>,
}

impl Extractor for PredicateExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        1
    }

    fn extract<'a>(&'a self, expr: &Arc<Expr>, _sub: &Substitution) -> Extractions<'a> {
        if (self.test)(expr) {
            Box::new(std::iter::once(smallvec![expr.clone()]))
        } else {
            Box::new(std::iter::empty())
        }
    }
}

/// Extractor built from a closure returning all extractions at once.
///
/// Handy for relations whose result set is small; implement [`Extractor`]
/// directly when the enumeration should be lazy.
pub struct RelationExtractor {
    name: String,
    arity: usize,
    relation: Arc<RelationFn>,
}

impl Extractor for RelationExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.arity
    }

    fn extract<'a>(&'a self, expr: &Arc<Expr>, sub: &Substitution) -> Extractions<'a> {
        Box::new((self.relation)(expr, sub).into_iter())
    }
}

/// Build a unary extractor from a predicate.
pub fn predicate<F>(name: impl Into<String>, test: F) -> Arc<dyn Extractor>
where
    F: Fn(&Arc<Expr>) -> bool + Send + Sync + 'static,
{
    Arc::new(PredicateExtractor { name: name.into(), test: Arc::new(test) })
}

/// Build an extractor of the given arity from a relation closure.
pub fn relation<F>(name: impl Into<String>, arity: usize, relation: F) -> Arc<dyn Extractor>
where
    F: Fn(&Arc<Expr>, &Substitution) -> Vec<Extraction> + Send + Sync + 'static,
{
    Arc::new(RelationExtractor { name: name.into(), arity, relation: Arc::new(relation) })
}
