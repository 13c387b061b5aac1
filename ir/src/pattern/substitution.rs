//! Substitutions: the binding environment built up during matching.
//!
//! A [`Substitution`] maps logic-variable names to either one expression
//! (plain variables) or an ordered run of expressions (sequence variables).
//! Every operation is non-destructive: binding returns a new substitution and
//! leaves the original untouched, which is what lets the matcher hand the
//! same parent substitution to several alternative branches.
//!
//! Rebinding a name succeeds only if the new value is structurally equal to
//! the existing one; a mismatch is a unification failure (`None`), not an
//! overwrite.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::Expr;

/// Ordered run of expressions bound to a sequence variable.
pub type Run = SmallVec<[Arc<Expr>; 4]>;

/// Value bound to a logic variable.
#[derive(Debug, Clone)]
pub enum Binding {
    Expr(Arc<Expr>),
    Run(Run),
}

impl Binding {
    pub fn as_expr(&self) -> Option<&Arc<Expr>> {
        match self {
            Binding::Expr(e) => Some(e),
            Binding::Run(_) => None,
        }
    }

    pub fn as_run(&self) -> Option<&[Arc<Expr>]> {
        match self {
            Binding::Run(run) => Some(run),
            Binding::Expr(_) => None,
        }
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Binding::Expr(a), Binding::Expr(b)) => Arc::ptr_eq(a, b) || **a == **b,
            (Binding::Run(a), Binding::Run(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| Arc::ptr_eq(x, y) || **x == **y)
            }
            _ => false,
        }
    }
}

impl Eq for Binding {}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Expr(e) => write!(f, "{e}"),
            Binding::Run(run) => {
                write!(f, "[")?;
                for (i, e) in run.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Entry: (variable name, bound value).
pub type BindingEntry = (Arc<str>, Binding);

/// Immutable variable-binding environment.
///
/// Bindings are kept in insertion order in a small vector; rule patterns
/// rarely bind more than a handful of names, so a linear scan beats hashing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    bindings: SmallVec<[BindingEntry; 4]>,
}

impl Substitution {
    /// The identity substitution.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|(n, _)| &**n == name).map(|(_, b)| b)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Expression bound to plain variable `name`.
    pub fn expr(&self, name: &str) -> Option<&Arc<Expr>> {
        self.get(name)?.as_expr()
    }

    /// Run bound to sequence variable `name`.
    pub fn run(&self, name: &str) -> Option<&[Arc<Expr>]> {
        self.get(name)?.as_run()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings.iter().map(|(n, b)| (&**n, b))
    }

    fn bind(&self, name: &Arc<str>, value: Binding) -> Option<Self> {
        if let Some(existing) = self.get(name) {
            return (*existing == value).then(|| self.clone());
        }
        let mut next = self.clone();
        next.bindings.push((name.clone(), value));
        Some(next)
    }

    /// Bind a plain variable.
    ///
    /// Succeeds if `name` is unbound or already bound to a structurally equal
    /// expression.
    pub fn bind_var(&self, name: &Arc<str>, value: Arc<Expr>) -> Option<Self> {
        self.bind(name, Binding::Expr(value))
    }

    /// Bind a sequence variable to a run.
    pub fn bind_seq(&self, name: &Arc<str>, run: impl IntoIterator<Item = Arc<Expr>>) -> Option<Self> {
        self.bind(name, Binding::Run(run.into_iter().collect()))
    }

    /// Consistent union of two substitutions.
    ///
    /// Fails if any name bound in both disagrees.
    pub fn merge(&self, other: &Substitution) -> Option<Self> {
        other.bindings.iter().try_fold(self.clone(), |acc, (name, value)| acc.bind(name, value.clone()))
    }

    /// Bindings sorted by name, for order-insensitive comparison.
    pub fn canonical(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> =
            self.bindings.iter().map(|(n, b)| (n.to_string(), b.to_string())).collect();
        entries.sort();
        entries
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.bindings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name} -> {value}")?;
        }
        write!(f, "}}")
    }
}
