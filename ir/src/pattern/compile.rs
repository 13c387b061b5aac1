//! Compiled patterns and the compilation pass.
//!
//! Compilation resolves operator and extractor names against a [`Registry`],
//! picks a matching strategy per compound, and rejects malformed patterns
//! before any rule can be applied.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use snafu::ensure;

use super::extractor::Extractor;
use super::spec::{PatternSpec, SeqMin};
use crate::error::{
    ExtractorAritySnafu, MultipleSequenceVarsSnafu, Result, SequenceVarOutsideCompoundSnafu, UnknownExtractorSnafu,
    VarKindConflictSnafu,
};
use crate::registry::Registry;
use crate::symbol::Operator;
use crate::Expr;

/// A compiled sequence variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqVar {
    pub name: Arc<str>,
    pub min: SeqMin,
}

/// How the children of a compound pattern are aligned with the children of
/// a candidate expression.
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    /// Positional, equal arity.
    Fixed,
    /// Ordered segmentation around one or more sequence variables.
    Segmented,
    /// Multiset matching, equal arity.
    Commutative,
    /// Multiset matching of the fixed children; the leftovers bind to the
    /// sequence variable. The variable is not part of `children`.
    CommutativeSeq(SeqVar),
}

#[derive(Debug, Clone)]
pub struct CompoundPattern {
    pub op: Arc<Operator>,
    pub strategy: MatchStrategy,
    pub children: Vec<Pattern>,
}

#[derive(Debug, Clone)]
pub struct ExtractPattern {
    pub extractor: Arc<dyn Extractor>,
    pub args: Vec<Pattern>,
}

/// A pattern ready for matching.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Leaf matched by structural equality.
    Ground(Arc<Expr>),
    /// Plain logic variable.
    Var(Arc<str>),
    /// Sequence variable; only valid as a child of a compound pattern.
    Seq(SeqVar),
    Compound(CompoundPattern),
    Extract(ExtractPattern),
}

/// Kind of every logic variable a pattern binds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternVars {
    vars: BTreeMap<Arc<str>, Option<SeqMin>>,
}

impl PatternVars {
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn is_seq(&self, name: &str) -> bool {
        matches!(self.vars.get(name), Some(Some(_)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(|k| &**k)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Collect variables, rejecting a name used both as plain and sequence var.
pub(crate) fn collect_vars(spec: &PatternSpec) -> Result<PatternVars> {
    let mut vars: BTreeMap<Arc<str>, Option<SeqMin>> = BTreeMap::new();
    let mut conflict = None;
    spec.for_each_var(&mut |name, kind| match vars.get(name) {
        Some(existing) if existing.is_some() != kind.is_some() => {
            conflict.get_or_insert_with(|| name.to_string());
        }
        Some(_) => {}
        None => {
            vars.insert(Arc::from(name), kind);
        }
    });
    if let Some(var) = conflict {
        return VarKindConflictSnafu { var }.fail();
    }
    Ok(PatternVars { vars })
}

impl Pattern {
    /// Compile a pattern description against `registry`.
    pub fn compile(spec: &PatternSpec, registry: &Registry) -> Result<Self> {
        collect_vars(spec)?;
        compile_node(spec, registry)
    }

    pub fn is_seq(&self) -> bool {
        matches!(self, Pattern::Seq(_))
    }

    /// Minimum number of children this element consumes inside a compound.
    pub(crate) fn min_width(&self) -> usize {
        match self {
            Pattern::Seq(sv) => sv.min.count(),
            _ => 1,
        }
    }
}

fn compile_node(spec: &PatternSpec, registry: &Registry) -> Result<Pattern> {
    match spec {
        PatternSpec::Var(name) => Ok(Pattern::Var(Arc::from(name.as_str()))),
        PatternSpec::Seq { name, .. } => SequenceVarOutsideCompoundSnafu { var: name.as_str() }.fail(),
        PatternSpec::Lit(v) => Ok(Pattern::Ground(Expr::literal(v.clone()))),
        PatternSpec::Sym(name) => Ok(Pattern::Ground(Expr::variable(name.clone()))),
        PatternSpec::Ground(e) => Ok(Pattern::Ground(e.clone())),
        PatternSpec::Ext { name, args } => {
            let extractor =
                registry.extractor(name).ok_or_else(|| UnknownExtractorSnafu { name: name.as_str() }.build())?;
            compile_extract(extractor, args, registry)
        }
        PatternSpec::App { op, args } => {
            let op = registry.operator(op)?;
            if op.is_extractor_backed() {
                let extractor = registry
                    .extractor(op.name())
                    .ok_or_else(|| UnknownExtractorSnafu { name: op.name() }.build())?;
                return compile_extract(extractor, args, registry);
            }
            compile_compound(op, args, registry)
        }
    }
}

fn compile_extract(extractor: Arc<dyn Extractor>, args: &[PatternSpec], registry: &Registry) -> Result<Pattern> {
    ensure!(
        extractor.arity() == args.len(),
        ExtractorAritySnafu { name: extractor.name(), expected: extractor.arity(), got: args.len() }
    );
    let args = args.iter().map(|a| compile_node(a, registry)).collect::<Result<Vec<_>>>()?;
    Ok(Pattern::Extract(ExtractPattern { extractor, args }))
}

fn compile_compound(op: Arc<Operator>, args: &[PatternSpec], registry: &Registry) -> Result<Pattern> {
    let mut children = Vec::with_capacity(args.len());
    for arg in args {
        children.push(match arg {
            PatternSpec::Seq { name, min } => Pattern::Seq(SeqVar { name: Arc::from(name.as_str()), min: *min }),
            other => compile_node(other, registry)?,
        });
    }

    let seq_count = children.iter().filter(|c| c.is_seq()).count();
    let strategy = match (op.is_commutative(), seq_count) {
        (false, 0) => MatchStrategy::Fixed,
        (false, _) => MatchStrategy::Segmented,
        (true, 0) => MatchStrategy::Commutative,
        (true, 1) => {
            let mut seq = None;
            children.retain(|c| match c {
                Pattern::Seq(sv) => {
                    seq = Some(sv.clone());
                    false
                }
                _ => true,
            });
            match seq {
                Some(sv) => MatchStrategy::CommutativeSeq(sv),
                None => MatchStrategy::Commutative,
            }
        }
        (true, _) => {
            let vars: Vec<String> = args
                .iter()
                .filter_map(|a| match a {
                    PatternSpec::Seq { name, .. } => Some(name.clone()),
                    _ => None,
                })
                .collect();
            return MultipleSequenceVarsSnafu { op: op.name(), vars }.fail();
        }
    };

    Ok(Pattern::Compound(CompoundPattern { op, strategy, children }))
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Ground(e) => write!(f, "{e}"),
            Pattern::Var(name) => write!(f, "?{name}"),
            Pattern::Seq(sv) => write!(f, "?&{}{}", sv.min, sv.name),
            Pattern::Compound(cp) => {
                write!(f, "({}", cp.op.symbol)?;
                for child in &cp.children {
                    write!(f, " {child}")?;
                }
                if let MatchStrategy::CommutativeSeq(sv) = &cp.strategy {
                    write!(f, " ?&{}{}", sv.min, sv.name)?;
                }
                write!(f, ")")
            }
            Pattern::Extract(ep) => {
                write!(f, "({}", ep.extractor.name())?;
                for arg in &ep.args {
                    write!(f, " {arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}
