use std::sync::Arc;

use test_case::test_case;

use crate::pattern::is_number;
use crate::pattern::spec::{app, ext, int, seq0, seq1, var};
use crate::test::fixtures::{apply, ints, plus, registry, remove_zero, seq, sort_descending, x};
use crate::{ConstValue, Error, Expr, GuardSpec, Rule, TransformSpec, apply_rule, define_rule};

fn inc_numbers(guarded: bool) -> Rule {
    let guard = guarded.then(|| GuardSpec::new(["x"], |sub| sub.expr("x").is_some_and(is_number)));
    define_rule(registry(), var("x"), app("inc", [var("x")]), guard).unwrap()
}

// ============================================================================
// Application
// ============================================================================

#[test]
fn test_remove_zero_from_binary_sum() {
    let rule = define_rule(registry(), app("+", [int(0), var("x")]), var("x"), None).unwrap();
    let result = apply_rule(&rule, &plus(ints(&[2, 0])));
    assert_eq!(result, Some(Expr::int(2)));
}

#[test_case(&[1, 0, 3], "(+ 1 3)" ; "zero in the middle")]
#[test_case(&[0], "(+)" ; "only zero")]
#[test_case(&[0, 0], "(+ 0)" ; "first zero only")]
fn test_remove_zero_with_sequence(children: &[i64], expected: &str) {
    let result = remove_zero().apply(&plus(ints(children)));
    assert_eq!(result.map(|e| e.to_string()).as_deref(), Some(expected));
}

#[test]
fn test_no_match_is_absence() {
    assert!(remove_zero().apply(&plus(ints(&[1, 2]))).is_none());
    assert!(remove_zero().apply(&x()).is_none());
}

#[test]
fn test_sort_step() {
    let result = sort_descending().apply(&seq(ints(&[1, 2, 3])));
    assert_eq!(result.map(|e| e.to_string()).as_deref(), Some("(° 2 1 3)"));
}

#[test]
fn test_sort_guard_backtracks() {
    // The first candidate (x=3, y=2) fails the guard; (x=3, y=5) is next.
    let result = sort_descending().apply(&seq(ints(&[3, 2, 5])));
    assert_eq!(result.map(|e| e.to_string()).as_deref(), Some("(° 5 2 3)"));
}

#[test]
fn test_sort_sorted_input_is_absence() {
    assert!(sort_descending().apply(&seq(ints(&[3, 2, 1]))).is_none());
}

#[test]
fn test_extractor_rule() {
    let rule = define_rule(
        registry(),
        app("+", [ext("zero?", [var("z")]), seq0("rest")]),
        app("+", [seq0("rest")]),
        None,
    )
    .unwrap();
    let result = rule.apply(&plus(ints(&[1, 0, 3])));
    assert_eq!(result.map(|e| e.to_string()).as_deref(), Some("(+ 1 3)"));

    let zero_matrix = Expr::literal(crate::Matrix::zeros(2, 2).unwrap());
    let result = rule.apply(&plus([Expr::int(1), zero_matrix, Expr::int(3)]));
    assert_eq!(result.map(|e| e.to_string()).as_deref(), Some("(+ 1 3)"));
}

#[test]
fn test_guard_rejection() {
    assert!(inc_numbers(true).apply(&x()).is_none());
    assert_eq!(inc_numbers(true).apply(&Expr::int(3)).map(|e| e.to_string()).as_deref(), Some("(inc 3)"));
}

#[test_case(x() ; "symbol")]
#[test_case(Expr::int(3) ; "number")]
#[test_case(plus(ints(&[1, 2])) ; "compound")]
fn test_guard_gating(e: Arc<Expr>) {
    let guarded = inc_numbers(true).apply(&e);
    let unguarded = inc_numbers(false).apply(&e);
    if is_number(&e) {
        assert_eq!(guarded, unguarded);
    } else {
        assert!(guarded.is_none());
        assert!(unguarded.is_some());
    }
}

#[test]
fn test_template_splices_runs() {
    let rule = define_rule(
        registry(),
        app("°", [seq0("a"), int(0), seq0("b")]),
        app("f", [seq0("b"), x().into(), seq0("a")]),
        None,
    )
    .unwrap();
    let result = rule.apply(&seq(ints(&[1, 2, 0, 3])));
    assert_eq!(result.map(|e| e.to_string()).as_deref(), Some("(f 3 x 1 2)"));
}

#[test]
fn test_relation_transform_takes_first_result() {
    let transform = TransformSpec::relation(["a"], |sub| {
        let a = sub.expr("a").cloned();
        a.into_iter().flat_map(|a| [apply("g", [a.clone()]), apply("f", [a])])
    });
    let rule = define_rule(registry(), app("f", [var("a")]), transform, None).unwrap();
    let result = rule.apply(&apply("f", ints(&[1])));
    assert_eq!(result.map(|e| e.to_string()).as_deref(), Some("(g 1)"));
}

#[test]
fn test_failing_transform_backtracks() {
    // The function fails on the first candidate (a=1) and succeeds on a=2.
    let transform = TransformSpec::func(["a"], |sub| {
        sub.expr("a").filter(|a| a.as_literal() == Some(&ConstValue::Int(2))).cloned()
    });
    let rule = define_rule(registry(), app("+", [var("a"), seq0("rest")]), transform, None).unwrap();
    assert_eq!(rule.apply(&plus(ints(&[1, 2]))), Some(Expr::int(2)));
    assert!(rule.apply(&plus(ints(&[1, 3]))).is_none());
}

#[test]
fn test_builder_and_label() {
    let rule = Rule::builder(registry())
        .name("unwrap_f")
        .pattern(app("f", [var("a")]))
        .transform(var("a"))
        .build()
        .unwrap();
    assert_eq!(rule.name(), Some("unwrap_f"));
    assert_eq!(rule.label(), "unwrap_f");
    assert!(!rule.has_guard());
    assert_eq!(rule.vars().names().collect::<Vec<_>>(), ["a"]);

    let anonymous = define_rule(registry(), app("f", [var("a")]), var("a"), None).unwrap();
    assert_eq!(anonymous.label(), "(f ?a)");
}

// ============================================================================
// Construction errors
// ============================================================================

#[test]
fn test_two_seq_vars_in_commutative_pattern() {
    let err = define_rule(registry(), app("+", [seq0("a"), seq1("b")]), int(0), None).unwrap_err();
    assert!(matches!(err, Error::MultipleSequenceVars { ref vars, .. } if vars == &["a", "b"]));
    assert!(err.is_rule_construction());
}

#[test]
fn test_unknown_extractor() {
    let err = define_rule(registry(), ext("missing?", [var("a")]), var("a"), None).unwrap_err();
    assert!(matches!(err, Error::UnknownExtractor { .. }));
}

#[test]
fn test_guard_references_unbound_var() {
    let guard = GuardSpec::new(["b"], |_| true);
    let err = define_rule(registry(), app("f", [var("a")]), var("a"), Some(guard)).unwrap_err();
    assert_eq!(err, Error::UnboundVariable { var: "b".into(), context: "guard" });
}

#[test]
fn test_template_references_unbound_var() {
    let err = define_rule(registry(), app("f", [var("a")]), app("g", [var("b")]), None).unwrap_err();
    assert_eq!(err, Error::UnboundVariable { var: "b".into(), context: "transform" });
}

#[test]
fn test_relation_references_unbound_var() {
    let transform = TransformSpec::func(["zz"], |_| None);
    let err = define_rule(registry(), app("f", [var("a")]), transform, None).unwrap_err();
    assert!(matches!(err, Error::UnboundVariable { context: "transform", .. }));
}

#[test]
fn test_extractor_in_template() {
    let err = define_rule(registry(), var("a"), ext("zero?", [var("a")]), None).unwrap_err();
    assert!(matches!(err, Error::ExtractorInTemplate { .. }));

    let err = define_rule(registry(), var("a"), app("zero?", [var("a")]), None).unwrap_err();
    assert!(matches!(err, Error::ExtractorInTemplate { .. }));
}

#[test]
fn test_seq_var_at_template_root() {
    let err = define_rule(registry(), app("°", [seq0("a")]), seq0("a"), None).unwrap_err();
    assert!(matches!(err, Error::SequenceVarInTemplateRoot { .. }));
}

#[test]
fn test_template_var_kind_mismatch() {
    let err = define_rule(registry(), app("°", [seq0("a")]), app("f", [var("a")]), None).unwrap_err();
    assert!(matches!(err, Error::VarKindConflict { .. }));
}

#[test]
fn test_unknown_symbol_in_template() {
    let err = define_rule(registry(), var("a"), app("nope", [var("a")]), None).unwrap_err();
    assert!(matches!(err, Error::UnknownSymbol { .. }));
}
