//! Helper predicates for extractors and guards.

use std::sync::Arc;

use crate::{ConstValue, Expr};

/// Check if an expression is a zero literal (numeric zero or all-zero matrix).
#[inline]
pub fn is_zero(expr: &Arc<Expr>) -> bool {
    expr.as_literal().is_some_and(ConstValue::is_zero)
}

/// Check if an expression is a one literal (numeric one or identity matrix).
#[inline]
pub fn is_one(expr: &Arc<Expr>) -> bool {
    expr.as_literal().is_some_and(ConstValue::is_one)
}

/// Check if an expression is a numeric literal.
#[inline]
pub fn is_number(expr: &Arc<Expr>) -> bool {
    expr.as_number().is_some()
}

/// True if both are numeric literals and `a > b`.
pub fn numeric_gt(a: &Arc<Expr>, b: &Arc<Expr>) -> bool {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.numeric_cmp(y) == Some(std::cmp::Ordering::Greater),
        _ => false,
    }
}
