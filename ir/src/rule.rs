//! Rules: pattern, guard, transform.
//!
//! A rule is built once through [`define_rule`] or [`Rule::builder`]. Every
//! name it refers to is resolved and every variable reference validated at
//! that point; a rule that exists can always be applied.
//!
//! ```ignore
//! use kestrel_ir::pattern::spec::*;
//!
//! // (+ 0 ?&*rest) -> (+ ?&*rest)
//! let rule = Rule::builder(&registry)
//!     .name("remove_zero")
//!     .pattern(app("+", [int(0), seq0("rest")]))
//!     .transform(app("+", [seq0("rest")]))
//!     .build()?;
//!
//! assert_eq!(rule.apply(&e).unwrap().to_string(), "(+ 1 3)");
//! ```

use std::fmt;
use std::sync::Arc;

use bon::bon;
use snafu::ensure;
use tracing::{debug, trace};

use crate::error::{
    ExtractorInTemplateSnafu, Result, SequenceVarInTemplateRootSnafu, UnboundVariableSnafu, VarKindConflictSnafu,
};
use crate::pattern::compile::collect_vars;
use crate::pattern::{Pattern, PatternSpec, PatternVars, Substitution};
use crate::registry::Registry;
use crate::symbol::Operator;
use crate::Expr;

/// Guard predicate over a match's substitution.
pub type GuardFn = dyn Fn(&Substitution) -> bool + Send + Sync;

/// Lazy results of a relational transform.
pub type Results = Box<dyn Iterator<Item = Arc<Expr>>>;

/// Relational transform: an empty result sequence is a failure.
pub type TransformFn = dyn Fn(&Substitution) -> Results + Send + Sync;

/// Guard description: the variables it reads plus the predicate.
#[derive(Clone)]
pub struct GuardSpec {
    vars: Vec<String>,
    test: Arc<GuardFn>,
}

impl GuardSpec {
    pub fn new<F>(vars: impl IntoIterator<Item = impl Into<String>>, test: F) -> Self
    where
        F: Fn(&Substitution) -> bool + Send + Sync + 'static,
    {
        Self { vars: vars.into_iter().map(Into::into).collect(), test: Arc::new(test) }
    }

    pub fn vars(&self) -> &[String] {
        &self.vars
    }
}

impl fmt::Debug for GuardSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardSpec").field("vars", &self.vars).finish_non_exhaustive()
    }
}

/// Transform description.
#[derive(Clone)]
pub enum TransformSpec {
    /// Template with variables replaced by their bindings.
    Template(PatternSpec),
    /// Function of the substitution producing candidate results.
    Relation { vars: Vec<String>, relation: Arc<TransformFn> },
}

impl TransformSpec {
    pub fn template(spec: PatternSpec) -> Self {
        TransformSpec::Template(spec)
    }

    /// Multi-valued transform; the rule takes the first result.
    pub fn relation<F, I>(vars: impl IntoIterator<Item = impl Into<String>>, relation: F) -> Self
    where
        F: Fn(&Substitution) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = Arc<Expr>>,
        I::IntoIter: 'static,
    {
        TransformSpec::Relation {
            vars: vars.into_iter().map(Into::into).collect(),
            relation: Arc::new(move |sub: &Substitution| -> Results { Box::new(relation(sub).into_iter()) }),
        }
    }

    /// Single-valued transform; `None` is a failure.
    pub fn func<F>(vars: impl IntoIterator<Item = impl Into<String>>, func: F) -> Self
    where
        F: Fn(&Substitution) -> Option<Arc<Expr>> + Send + Sync + 'static,
    {
        Self::relation(vars, func)
    }
}

impl From<PatternSpec> for TransformSpec {
    fn from(spec: PatternSpec) -> Self {
        TransformSpec::Template(spec)
    }
}

impl fmt::Debug for TransformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformSpec::Template(spec) => write!(f, "Template({spec})"),
            TransformSpec::Relation { vars, .. } => write!(f, "Relation({vars:?})"),
        }
    }
}

/// Compiled transform template.
#[derive(Debug, Clone)]
pub enum Template {
    Ground(Arc<Expr>),
    Var(Arc<str>),
    /// Spliced into the enclosing application.
    Seq(Arc<str>),
    Apply { op: Arc<Operator>, children: Vec<Template> },
}

impl Template {
    fn compile(spec: &PatternSpec, registry: &Registry, vars: &PatternVars) -> Result<Self> {
        if let PatternSpec::Seq { name, .. } = spec {
            return SequenceVarInTemplateRootSnafu { var: name.as_str() }.fail();
        }
        Self::compile_node(spec, registry, vars)
    }

    fn compile_node(spec: &PatternSpec, registry: &Registry, vars: &PatternVars) -> Result<Self> {
        match spec {
            PatternSpec::Var(name) | PatternSpec::Seq { name, .. } => {
                let want_seq = matches!(spec, PatternSpec::Seq { .. });
                ensure!(vars.contains(name), UnboundVariableSnafu { var: name.as_str(), context: "transform" });
                ensure!(vars.is_seq(name) == want_seq, VarKindConflictSnafu { var: name.as_str() });
                let name = Arc::from(name.as_str());
                Ok(if want_seq { Template::Seq(name) } else { Template::Var(name) })
            }
            PatternSpec::Lit(v) => Ok(Template::Ground(Expr::literal(v.clone()))),
            PatternSpec::Sym(name) => Ok(Template::Ground(Expr::variable(name.clone()))),
            PatternSpec::Ground(e) => Ok(Template::Ground(e.clone())),
            PatternSpec::Ext { name, .. } => ExtractorInTemplateSnafu { name: name.as_str() }.fail(),
            PatternSpec::App { op, args } => {
                let op = registry.operator(op)?;
                ensure!(!op.is_extractor_backed(), ExtractorInTemplateSnafu { name: op.name() });
                let children =
                    args.iter().map(|a| Self::compile_node(a, registry, vars)).collect::<Result<Vec<_>>>()?;
                Ok(Template::Apply { op, children })
            }
        }
    }

    /// Instantiate under `sub`. `None` if a referenced variable is unbound.
    pub fn instantiate(&self, sub: &Substitution) -> Option<Arc<Expr>> {
        match self {
            Template::Ground(e) => Some(e.clone()),
            Template::Var(name) => sub.expr(name).cloned(),
            Template::Seq(_) => None,
            Template::Apply { op, children } => {
                let mut out = Vec::with_capacity(children.len());
                for child in children {
                    match child {
                        Template::Seq(name) => out.extend(sub.run(name)?.iter().cloned()),
                        other => out.push(other.instantiate(sub)?),
                    }
                }
                Some(Expr::compound(op, out))
            }
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Template::Ground(e) => write!(f, "{e}"),
            Template::Var(name) => write!(f, "?{name}"),
            Template::Seq(name) => write!(f, "?&{name}"),
            Template::Apply { op, children } => {
                write!(f, "({}", op.symbol)?;
                for child in children {
                    write!(f, " {child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Compiled transform.
#[derive(Clone)]
pub enum Transform {
    Template(Template),
    Relation(Arc<TransformFn>),
}

impl Transform {
    pub fn apply(&self, sub: &Substitution) -> Option<Arc<Expr>> {
        match self {
            Transform::Template(t) => t.instantiate(sub),
            Transform::Relation(f) => f(sub).next(),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Template(t) => write!(f, "Template({t})"),
            Transform::Relation(_) => f.write_str("Relation(<fn>)"),
        }
    }
}

/// An immutable rewrite rule.
#[derive(Clone, derive_more::Debug)]
pub struct Rule {
    name: Option<Arc<str>>,
    pattern: Pattern,
    #[debug(skip)]
    vars: PatternVars,
    #[debug(skip)]
    guard: Option<Arc<GuardFn>>,
    transform: Transform,
}

/// Build a rule, validating it against `registry`.
pub fn define_rule(
    registry: &Registry,
    pattern: PatternSpec,
    transform: impl Into<TransformSpec>,
    guard: Option<GuardSpec>,
) -> Result<Rule> {
    Rule::builder(registry).pattern(pattern).transform(transform.into()).maybe_guard(guard).build()
}

#[bon]
impl Rule {
    #[builder]
    pub fn new(
        #[builder(start_fn)] registry: &Registry,
        #[builder(into)] name: Option<String>,
        pattern: PatternSpec,
        #[builder(into)] transform: TransformSpec,
        guard: Option<GuardSpec>,
    ) -> Result<Self> {
        let vars = collect_vars(&pattern)?;
        let compiled = Pattern::compile(&pattern, registry)?;

        let guard = match guard {
            Some(spec) => {
                check_declared(&spec.vars, &vars, "guard")?;
                Some(spec.test)
            }
            None => None,
        };

        let transform = match transform {
            TransformSpec::Template(spec) => Transform::Template(Template::compile(&spec, registry, &vars)?),
            TransformSpec::Relation { vars: declared, relation } => {
                check_declared(&declared, &vars, "transform")?;
                Transform::Relation(relation)
            }
        };

        Ok(Self { name: name.map(Arc::from), pattern: compiled, vars, guard, transform })
    }
}

fn check_declared(declared: &[String], vars: &PatternVars, context: &'static str) -> Result<()> {
    for var in declared {
        ensure!(vars.contains(var), UnboundVariableSnafu { var: var.as_str(), context });
    }
    Ok(())
}

impl Rule {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name for logs: the rule name, or the pattern.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.to_string(),
            None => self.pattern.to_string(),
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn vars(&self) -> &PatternVars {
        &self.vars
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn has_guard(&self) -> bool {
        self.guard.is_some()
    }

    /// Apply at the root of `expr`.
    ///
    /// Candidates are tried in the matcher's enumeration order; the first
    /// one that passes the guard and for which the transform produces a
    /// result wins. `None` means no match, never an error.
    pub fn apply(&self, expr: &Arc<Expr>) -> Option<Arc<Expr>> {
        for sub in self.pattern.match_expr(expr) {
            if let Some(guard) = &self.guard
                && !guard(&sub)
            {
                trace!(rule = %self.label(), %sub, "guard rejected");
                continue;
            }
            match self.transform.apply(&sub) {
                Some(result) => {
                    debug!(rule = %self.label(), %expr, %result, "rule fired");
                    return Some(result);
                }
                None => trace!(rule = %self.label(), %sub, "transform failed"),
            }
        }
        None
    }
}

/// Apply `rule` at the root of `expr`.
pub fn apply_rule(rule: &Rule, expr: &Arc<Expr>) -> Option<Arc<Expr>> {
    rule.apply(expr)
}
