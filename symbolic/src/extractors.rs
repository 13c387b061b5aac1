//! Standard extractors.
//!
//! | Name | Arity | Accepts | Binds |
//! |------|-------|---------|-------|
//! | `zero?` | 1 | numeric zero, all-zero matrix | the literal |
//! | `one?` | 1 | numeric one, identity matrix | the literal |
//! | `number?` | 1 | numeric scalar literal | the literal |
//! | `neg?` | 1 | `(- a)`, negative scalar literal | `a`, or the magnitude |

use std::sync::Arc;

use kestrel_ir::pattern::{Extractions, Extractor, is_number, is_one, is_zero, predicate};
use kestrel_ir::{ConstValue, Expr, Substitution};
use smallvec::smallvec;

/// Name of the negation operator `neg?` looks through.
pub const NEG: &str = "-";

pub fn zero() -> Arc<dyn Extractor> {
    predicate("zero?", is_zero)
}

pub fn one() -> Arc<dyn Extractor> {
    predicate("one?", is_one)
}

pub fn number() -> Arc<dyn Extractor> {
    predicate("number?", is_number)
}

pub fn neg() -> Arc<dyn Extractor> {
    Arc::new(Negation)
}

/// All standard extractors, in registration order.
pub fn standard_extractors() -> Vec<Arc<dyn Extractor>> {
    vec![zero(), one(), number(), neg()]
}

/// Matches a negated quantity and binds its magnitude.
///
/// `(- a)` yields `a`; a negative literal `-n` yields the literal `n`.
/// `i64::MIN` has no positive counterpart and is rejected.
struct Negation;

impl Negation {
    fn magnitude(expr: &Arc<Expr>) -> Option<Arc<Expr>> {
        if expr.is_application_of(NEG)
            && let [operand] = expr.children()
        {
            return Some(operand.clone());
        }
        match expr.as_literal()? {
            ConstValue::Int(v) if *v < 0 => v.checked_neg().map(Expr::int),
            ConstValue::Float(v) if *v < 0.0 => Some(Expr::float(-v)),
            _ => None,
        }
    }
}

impl Extractor for Negation {
    fn name(&self) -> &str {
        "neg?"
    }

    fn arity(&self) -> usize {
        1
    }

    fn extract<'a>(&'a self, expr: &Arc<Expr>, _sub: &Substitution) -> Extractions<'a> {
        Box::new(Self::magnitude(expr).map(|m| smallvec![m]).into_iter())
    }
}
