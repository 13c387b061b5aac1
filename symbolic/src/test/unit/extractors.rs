use std::sync::Arc;

use kestrel_ir::pattern::spec::{app, var};
use kestrel_ir::{Expr, Matrix, Pattern};
use test_case::test_case;

use crate::test::fixtures::{neg, registry, x};

/// Value bound by `(name ?v)` against `expr`, if it matches.
fn extract(name: &str, expr: &Arc<Expr>) -> Option<Arc<Expr>> {
    let pattern = Pattern::compile(&app(name, [var("v")]), registry()).unwrap();
    pattern.match_first(expr).and_then(|sub| sub.expr("v").cloned())
}

#[test_case(Expr::int(0), true ; "int zero")]
#[test_case(Expr::float(0.0), true ; "float zero")]
#[test_case(Expr::literal(Matrix::zeros(2, 3).unwrap()), true ; "zero matrix")]
#[test_case(Expr::int(1), false ; "one")]
#[test_case(Expr::literal(Matrix::identity(2).unwrap()), false ; "identity matrix")]
#[test_case(Expr::variable("x"), false ; "variable")]
fn test_zero(expr: Arc<Expr>, accepted: bool) {
    assert_eq!(extract("zero?", &expr), accepted.then(|| expr.clone()));
}

#[test_case(Expr::int(1), true ; "int one")]
#[test_case(Expr::float(1.0), true ; "float one")]
#[test_case(Expr::literal(Matrix::identity(3).unwrap()), true ; "identity matrix")]
#[test_case(Expr::int(2), false ; "two")]
fn test_one(expr: Arc<Expr>, accepted: bool) {
    assert_eq!(extract("one?", &expr), accepted.then(|| expr.clone()));
}

#[test_case(Expr::int(-7), true ; "int")]
#[test_case(Expr::float(2.5), true ; "float")]
#[test_case(Expr::bool(true), false ; "bool")]
#[test_case(Expr::literal(Matrix::zeros(1, 1).unwrap()), false ; "matrix")]
#[test_case(Expr::variable("n"), false ; "variable")]
fn test_number(expr: Arc<Expr>, accepted: bool) {
    assert_eq!(extract("number?", &expr), accepted.then(|| expr.clone()));
}

#[test_case(neg(x()), Some(x()) ; "negation binds operand")]
#[test_case(Expr::int(-3), Some(Expr::int(3)) ; "negative int")]
#[test_case(Expr::float(-2.5), Some(Expr::float(2.5)) ; "negative float")]
#[test_case(Expr::int(3), None ; "positive int")]
#[test_case(Expr::int(0), None ; "zero")]
#[test_case(Expr::int(i64::MIN), None ; "no magnitude")]
#[test_case(x(), None ; "variable")]
fn test_neg(expr: Arc<Expr>, expected: Option<Arc<Expr>>) {
    assert_eq!(extract("neg?", &expr), expected);
}

#[test]
fn test_neg_requires_unary_application() {
    let binary = registry().apply("-", [x(), Expr::int(1)]).unwrap();
    assert_eq!(extract("neg?", &binary), None);
}

#[test]
fn test_extractor_binds_inner_pattern() {
    // (neg? (neg? ?v)) peels two negations.
    let pattern = Pattern::compile(&app("neg?", [app("neg?", [var("v")])]), registry()).unwrap();
    let sub = pattern.match_first(&neg(neg(x()))).unwrap();
    assert_eq!(sub.expr("v"), Some(&x()));

    let sub = pattern.match_first(&neg(Expr::int(-4))).unwrap();
    assert_eq!(sub.expr("v"), Some(&Expr::int(4)));
}
