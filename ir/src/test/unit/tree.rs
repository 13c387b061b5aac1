use crate::Expr;
use crate::test::fixtures::{plus, seq, x};

#[test]
fn test_tree_simple() {
    let e = plus([Expr::int(1), x()]);
    let tree = e.tree();
    println!("Tree output:\n{tree}");
    assert!(tree.contains("+ /2"));
    assert!(tree.contains("LIT(1)"));
    assert!(tree.contains("VAR(x)"));
    assert_eq!(tree.lines().count(), 3);
}

#[test]
fn test_tree_nested() {
    let e = seq([plus([x()]), Expr::float(2.5)]);
    let tree = e.tree();
    assert!(tree.contains("° /2"));
    assert!(tree.contains("+ /1"));
    assert!(tree.contains("LIT(2.5)"));
    assert!(tree.contains(&format!("[{}]", e.id)));
}
