//! Uncompiled pattern descriptions.
//!
//! A [`PatternSpec`] refers to operators and extractors by name. It is the
//! input of [`Pattern::compile`](super::Pattern::compile) and of rule
//! templates, and can be built without a registry at hand:
//!
//! ```ignore
//! use kestrel_ir::pattern::spec::*;
//!
//! // (+ (zero? ?x) ?&*rest)
//! let p = app("+", [ext("zero?", [var("x")]), seq0("rest")]);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::symbol::Symbol;
use crate::types::ConstValue;
use crate::Expr;

/// Minimum run length of a sequence variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum SeqMin {
    /// `?&*name`: zero or more expressions.
    #[strum(to_string = "*")]
    ZeroOrMore,
    /// `?&+name`: one or more expressions.
    #[strum(to_string = "+")]
    OneOrMore,
}

impl SeqMin {
    /// Smallest admissible run length.
    pub fn count(self) -> usize {
        match self {
            SeqMin::ZeroOrMore => 0,
            SeqMin::OneOrMore => 1,
        }
    }
}

/// Name-based pattern tree.
#[derive(Debug, Clone)]
pub enum PatternSpec {
    /// Plain logic variable.
    Var(String),
    /// Sequence logic variable.
    Seq { name: String, min: SeqMin },
    /// Literal that must match exactly.
    Lit(ConstValue),
    /// Symbolic variable (an expression leaf, not a logic variable).
    Sym(Symbol),
    /// Any pre-built expression, matched structurally.
    Ground(Arc<Expr>),
    /// Operator application by symbol name.
    App { op: String, args: Vec<PatternSpec> },
    /// Extractor application by registry name.
    Ext { name: String, args: Vec<PatternSpec> },
}

pub fn var(name: impl Into<String>) -> PatternSpec {
    PatternSpec::Var(name.into())
}

pub fn seq0(name: impl Into<String>) -> PatternSpec {
    PatternSpec::Seq { name: name.into(), min: SeqMin::ZeroOrMore }
}

pub fn seq1(name: impl Into<String>) -> PatternSpec {
    PatternSpec::Seq { name: name.into(), min: SeqMin::OneOrMore }
}

pub fn app(op: impl Into<String>, args: impl IntoIterator<Item = PatternSpec>) -> PatternSpec {
    PatternSpec::App { op: op.into(), args: args.into_iter().collect() }
}

pub fn ext(name: impl Into<String>, args: impl IntoIterator<Item = PatternSpec>) -> PatternSpec {
    PatternSpec::Ext { name: name.into(), args: args.into_iter().collect() }
}

pub fn lit(value: impl Into<ConstValue>) -> PatternSpec {
    PatternSpec::Lit(value.into())
}

pub fn int(value: i64) -> PatternSpec {
    PatternSpec::Lit(ConstValue::Int(value))
}

pub fn float(value: f64) -> PatternSpec {
    PatternSpec::Lit(ConstValue::Float(value))
}

pub fn sym(name: impl Into<Symbol>) -> PatternSpec {
    PatternSpec::Sym(name.into())
}

pub fn ground(expr: Arc<Expr>) -> PatternSpec {
    PatternSpec::Ground(expr)
}

impl From<Arc<Expr>> for PatternSpec {
    fn from(expr: Arc<Expr>) -> Self {
        PatternSpec::Ground(expr)
    }
}

impl PatternSpec {
    /// Visit every logic variable in pre-order: `(name, Some(min))` for
    /// sequence variables, `(name, None)` for plain ones.
    pub fn for_each_var<'s>(&'s self, f: &mut impl FnMut(&'s str, Option<SeqMin>)) {
        match self {
            PatternSpec::Var(name) => f(name, None),
            PatternSpec::Seq { name, min } => f(name, Some(*min)),
            PatternSpec::App { args, .. } | PatternSpec::Ext { args, .. } => {
                args.iter().for_each(|arg| arg.for_each_var(f));
            }
            PatternSpec::Lit(_) | PatternSpec::Sym(_) | PatternSpec::Ground(_) => {}
        }
    }
}

impl fmt::Display for PatternSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternSpec::Var(name) => write!(f, "?{name}"),
            PatternSpec::Seq { name, min } => write!(f, "?&{min}{name}"),
            PatternSpec::Lit(v) => write!(f, "{v}"),
            PatternSpec::Sym(name) => write!(f, "{name}"),
            PatternSpec::Ground(e) => write!(f, "{e}"),
            PatternSpec::App { op: head, args } | PatternSpec::Ext { name: head, args } => {
                write!(f, "({head}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}
