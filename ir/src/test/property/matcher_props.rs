use std::sync::Arc;

use proptest::prelude::*;

use crate::pattern::spec::{app, ext, int, seq0, seq1, var};
use crate::pattern::{Binding, Pattern, PatternSpec, SeqMin, Substitution};
use crate::test::fixtures::{plus, registry, seq};
use crate::test::property::generators::{arb_permuted_children, arb_sum_children};
use crate::Expr;

fn compile(spec: PatternSpec) -> Pattern {
    Pattern::compile(&spec, registry()).expect("pattern should compile")
}

/// Substitution as sorted `(name, value)` pairs, runs compared as multisets.
fn canonical_multiset(sub: &Substitution) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = sub
        .iter()
        .map(|(name, binding)| {
            let value = match binding {
                Binding::Expr(e) => e.to_string(),
                Binding::Run(run) => {
                    let mut items: Vec<String> = run.iter().map(|e| e.to_string()).collect();
                    items.sort();
                    format!("[{}]", items.join(" "))
                }
            };
            (name.to_string(), value)
        })
        .collect();
    entries.sort();
    entries
}

fn solution_set(pattern: &Pattern, expr: &Arc<Expr>) -> Vec<Vec<(String, String)>> {
    let mut all: Vec<_> = pattern.match_expr(expr).map(|s| canonical_multiset(&s)).collect();
    all.sort();
    all
}

fn commutative_patterns() -> Vec<Pattern> {
    vec![
        compile(app("+", [int(0), var("x")])),
        compile(app("+", [var("a"), var("b")])),
        compile(app("+", [var("a"), var("b"), var("c")])),
        compile(app("+", [var("a"), seq0("rest")])),
        compile(app("+", [int(1), var("a"), seq1("rest")])),
        compile(app("+", [ext("zero?", [var("z")]), seq0("rest")])),
        compile(app("+", [var("a"), var("a"), seq0("rest")])),
    ]
}

/// Pattern with `fixed` plain variables and one trailing sequence variable.
fn arity_pattern(op: &str, fixed: usize, min: SeqMin) -> Pattern {
    let mut args: Vec<PatternSpec> = (0..fixed).map(|i| var(format!("v{i}"))).collect();
    args.push(match min {
        SeqMin::ZeroOrMore => seq0("rest"),
        SeqMin::OneOrMore => seq1("rest"),
    });
    compile(app(op, args))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Permuting the children of a commutative compound never changes the
    /// set of solutions.
    #[test]
    fn commutative_order_independence((original, shuffled) in arb_permuted_children(5)) {
        let a = plus(original);
        let b = plus(shuffled);
        for pattern in commutative_patterns() {
            prop_assert_eq!(solution_set(&pattern, &a), solution_set(&pattern, &b), "pattern {}", pattern);
        }
    }

    /// A `min:0` sequence variable accepts any arity at least the fixed
    /// count; `min:1` additionally needs one more child.
    #[test]
    fn sequence_arity_generality(fixed in 0usize..4, children in arb_sum_children(6), commutative in any::<bool>()) {
        let op = if commutative { "+" } else { "°" };
        let expr = if commutative { plus(children.clone()) } else { seq(children.clone()) };
        let m = children.len();

        let zero_or_more = arity_pattern(op, fixed, SeqMin::ZeroOrMore);
        let one_or_more = arity_pattern(op, fixed, SeqMin::OneOrMore);

        prop_assert_eq!(zero_or_more.matches(&expr), m >= fixed);
        prop_assert_eq!(one_or_more.matches(&expr), m > fixed);
    }

    /// Every segmentation reassembles to the original children.
    #[test]
    fn segmentation_is_sound(children in arb_sum_children(6)) {
        let expr = seq(children.clone());
        let pattern = compile(app("°", [seq0("a"), var("x"), seq0("b")]));
        let mut count = 0;
        for sub in pattern.match_expr(&expr) {
            let mut rebuilt: Vec<Arc<Expr>> = sub.run("a").unwrap_or_default().to_vec();
            rebuilt.extend(sub.expr("x").cloned());
            rebuilt.extend(sub.run("b").unwrap_or_default().iter().cloned());
            prop_assert_eq!(&rebuilt, &children);
            count += 1;
        }
        prop_assert_eq!(count, children.len());
    }

    /// The first solution is the head of the full enumeration.
    #[test]
    fn match_first_is_first(children in arb_sum_children(5)) {
        let expr = plus(children);
        for pattern in commutative_patterns() {
            let first = pattern.match_first(&expr);
            let head = pattern.match_expr(&expr).next();
            prop_assert_eq!(first, head);
        }
    }
}
