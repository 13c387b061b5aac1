use std::sync::Arc;

use crate::pattern::{is_zero, predicate};
use crate::test::fixtures::{ints, registry};
use crate::{Error, ExecHandle, Expr, MatcherClass, Registry, SymbolProps, SymbolResolver};

#[test]
fn test_symbol_props_defaults() {
    let props = SymbolProps::fixed();
    assert!(!props.commutative);
    assert!(!props.associative);
    assert!(props.identity.is_none());
    assert!(props.exec.is_none());
    assert_eq!(props.matcher_class, MatcherClass::Fixed);
}

#[test]
fn test_commutative_implies_matcher_class() {
    let props = SymbolProps::builder().commutative(true).identity(Expr::int(0)).build();
    assert_eq!(props.matcher_class, MatcherClass::Commutative);
    assert_eq!(props.identity.as_deref(), Some(&*Expr::int(0)));
}

#[test]
fn test_explicit_matcher_class_wins() {
    let props = SymbolProps::builder().commutative(true).matcher_class(MatcherClass::Fixed).build();
    assert!(props.commutative);
    assert_eq!(props.matcher_class, MatcherClass::Fixed);
    assert_eq!(SymbolProps::extractor_backed().matcher_class, MatcherClass::ExtractorBacked);
}

#[test]
fn test_exec_handle_downcast() {
    let handle = ExecHandle::new(42_u32);
    assert!(!handle.is_none());
    assert_eq!(handle.downcast_ref::<u32>(), Some(&42));
    assert!(handle.downcast_ref::<i64>().is_none());
    assert_eq!(format!("{handle:?}"), "ExecHandle(<opaque>)");
}

#[test]
fn test_lookup() {
    let op = registry().operator("+").expect("+ is registered");
    assert!(op.is_commutative());
    assert!(op.props.associative);
    assert!(registry().resolve("*").is_some());
    assert!(registry().resolve("missing").is_none());
    assert!(registry().extractor("zero?").is_some());
    assert!(registry().symbols().get("zero?").is_some_and(|op| op.is_extractor_backed()));
}

#[test]
fn test_apply_builds_compound() {
    let e = registry().apply("+", ints(&[1, 2])).unwrap();
    assert_eq!(e.to_string(), "(+ 1 2)");
    assert!(e.operator().is_some_and(|op| Arc::ptr_eq(op, &registry().operator("+").unwrap())));
}

#[test]
fn test_apply_unknown_symbol() {
    let err = registry().apply("nope", ints(&[1])).unwrap_err();
    assert_eq!(err, Error::UnknownSymbol { symbol: "nope".into() });
    assert_eq!(err.to_string(), "unknown operator symbol 'nope'");
}

#[test]
fn test_duplicate_symbol_rejected() {
    let err = Registry::builder()
        .define_symbol("h", SymbolProps::fixed())
        .and_then(|b| b.define_symbol("h", SymbolProps::fixed()))
        .unwrap_err();
    assert_eq!(err, Error::DuplicateSymbol { symbol: "h".into() });
}

#[test]
fn test_duplicate_extractor_rejected() {
    let err = Registry::builder()
        .define_extractor(predicate("z?", is_zero))
        .and_then(|b| b.define_extractor(predicate("z?", is_zero)))
        .unwrap_err();
    assert_eq!(err, Error::DuplicateExtractor { name: "z?".into() });
}

#[test]
fn test_scoped_registries_are_independent() {
    let a = Registry::builder().define_symbol("h", SymbolProps::fixed()).unwrap().build();
    let b = Registry::builder().build();
    assert!(a.operator("h").is_ok());
    assert!(b.operator("h").is_err());
    assert_eq!(a.symbols().len(), 1);
    assert!(b.extractors().is_empty());
}
