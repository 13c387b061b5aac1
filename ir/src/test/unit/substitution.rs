use std::sync::Arc;

use crate::Expr;
use crate::pattern::{Binding, Substitution};
use crate::test::fixtures::{ints, plus, x, y};

fn name(s: &str) -> Arc<str> {
    Arc::from(s)
}

#[test]
fn test_empty() {
    let sub = Substitution::empty();
    assert!(sub.is_empty());
    assert_eq!(sub.len(), 0);
    assert!(sub.get("x").is_none());
}

#[test]
fn test_bind_var() {
    let sub = Substitution::empty().bind_var(&name("a"), Expr::int(1)).expect("fresh binding");
    assert_eq!(sub.len(), 1);
    assert_eq!(sub.expr("a"), Some(&Expr::int(1)));
    assert!(sub.run("a").is_none(), "plain binding is not a run");
}

#[test]
fn test_rebind_equal_value_succeeds() {
    let sub = Substitution::empty().bind_var(&name("a"), plus([x(), y()])).unwrap();
    let again = sub.bind_var(&name("a"), plus([x(), y()])).expect("equal rebinding is consistent");
    assert_eq!(again.len(), 1);
}

#[test]
fn test_rebind_different_value_fails() {
    let sub = Substitution::empty().bind_var(&name("a"), Expr::int(1)).unwrap();
    assert!(sub.bind_var(&name("a"), Expr::int(2)).is_none());
}

#[test]
fn test_binding_is_non_destructive() {
    let base = Substitution::empty().bind_var(&name("a"), Expr::int(1)).unwrap();
    let extended = base.bind_var(&name("b"), Expr::int(2)).unwrap();
    assert_eq!(base.len(), 1);
    assert_eq!(extended.len(), 2);
    assert!(base.get("b").is_none());
}

#[test]
fn test_bind_seq() {
    let sub = Substitution::empty().bind_seq(&name("rest"), ints(&[1, 2, 3])).unwrap();
    assert_eq!(sub.run("rest").map(|r| r.len()), Some(3));
    assert!(sub.expr("rest").is_none());

    assert!(sub.bind_seq(&name("rest"), ints(&[1, 2, 3])).is_some());
    assert!(sub.bind_seq(&name("rest"), ints(&[1, 2])).is_none());
    assert!(sub.bind_seq(&name("rest"), ints(&[3, 2, 1])).is_none(), "runs are ordered");
}

#[test]
fn test_empty_run() {
    let sub = Substitution::empty().bind_seq(&name("rest"), Vec::new()).unwrap();
    assert_eq!(sub.run("rest"), Some(&[][..]));
}

#[test]
fn test_kind_mismatch_fails() {
    let sub = Substitution::empty().bind_var(&name("a"), Expr::int(1)).unwrap();
    assert!(sub.bind_seq(&name("a"), ints(&[1])).is_none());
}

#[test]
fn test_merge_consistent() {
    let left = Substitution::empty().bind_var(&name("a"), Expr::int(1)).unwrap();
    let right = Substitution::empty()
        .bind_var(&name("a"), Expr::int(1))
        .and_then(|s| s.bind_var(&name("b"), x()))
        .unwrap();
    let merged = left.merge(&right).expect("shared binding agrees");
    assert_eq!(merged.len(), 2);
    assert_eq!(merged.expr("b"), Some(&x()));
}

#[test]
fn test_merge_conflict() {
    let left = Substitution::empty().bind_var(&name("a"), Expr::int(1)).unwrap();
    let right = Substitution::empty().bind_var(&name("a"), Expr::int(2)).unwrap();
    assert!(left.merge(&right).is_none());
}

#[test]
fn test_iter_preserves_insertion_order() {
    let sub = Substitution::empty()
        .bind_var(&name("z"), Expr::int(1))
        .and_then(|s| s.bind_seq(&name("a"), ints(&[2])))
        .unwrap();
    let names: Vec<&str> = sub.iter().map(|(n, _)| n).collect();
    assert_eq!(names, ["z", "a"]);
    assert!(matches!(sub.get("a"), Some(Binding::Run(_))));
}

#[test]
fn test_display() {
    let sub = Substitution::empty()
        .bind_var(&name("x"), Expr::int(1))
        .and_then(|s| s.bind_seq(&name("rest"), ints(&[2, 3])))
        .unwrap();
    assert_eq!(sub.to_string(), "{x -> 1, rest -> [2 3]}");
}
