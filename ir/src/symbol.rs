//! Operator symbols and their semantic properties.
//!
//! The construction phase decides what an operator *means* to the matcher:
//! whether it is commutative, associative, which element is its identity,
//! and which callable executes it. The engine only ever sees the resolved
//! [`Operator`] record, never the dispatch that produced it.

use std::any::Any;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bon::bon;

use crate::Expr;

/// Interned operator or variable name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Symbol(Arc::from(s))
    }
}

/// How compound patterns headed by an operator are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
pub enum MatcherClass {
    /// Children are matched positionally (or by ordered segmentation).
    Fixed,
    /// Children are matched as a multiset.
    Commutative,
    /// Patterns headed by this symbol are extractor applications.
    ExtractorBacked,
}

/// Opaque execution payload attached by the construction phase.
///
/// The rewriting core never looks inside; downstream consumers (constant
/// folding, code generation) downcast it to the callable type they expect.
#[derive(Clone, Default)]
pub struct ExecHandle(Option<Arc<dyn Any + Send + Sync>>);

impl ExecHandle {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
        Self(Some(Arc::new(payload)))
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.as_ref()?.downcast_ref::<T>()
    }
}

impl fmt::Debug for ExecHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("ExecHandle(<opaque>)"),
            None => f.write_str("ExecHandle(none)"),
        }
    }
}

/// Semantic properties of an operator symbol.
#[derive(Debug, Clone)]
pub struct SymbolProps {
    pub commutative: bool,
    pub associative: bool,
    /// Identity element, e.g. `0` for `+`.
    pub identity: Option<Arc<Expr>>,
    pub exec: ExecHandle,
    pub matcher_class: MatcherClass,
}

#[bon]
impl SymbolProps {
    /// Build a property record.
    ///
    /// `matcher_class` defaults to [`MatcherClass::Commutative`] for
    /// commutative operators and [`MatcherClass::Fixed`] otherwise.
    ///
    /// ```ignore
    /// let plus = SymbolProps::builder().commutative(true).associative(true).identity(Expr::int(0)).build();
    /// ```
    #[builder]
    pub fn new(
        #[builder(default)] commutative: bool,
        #[builder(default)] associative: bool,
        identity: Option<Arc<Expr>>,
        #[builder(default)] exec: ExecHandle,
        matcher_class: Option<MatcherClass>,
    ) -> Self {
        let matcher_class =
            matcher_class.unwrap_or(if commutative { MatcherClass::Commutative } else { MatcherClass::Fixed });
        Self { commutative, associative, identity, exec, matcher_class }
    }

    /// Plain positional operator with no algebraic properties.
    pub fn fixed() -> Self {
        Self::builder().build()
    }

    /// Properties of a symbol whose patterns delegate to an extractor.
    pub fn extractor_backed() -> Self {
        Self::builder().matcher_class(MatcherClass::ExtractorBacked).build()
    }
}

impl Default for SymbolProps {
    fn default() -> Self {
        Self::fixed()
    }
}

/// A resolved operator: symbol plus properties.
///
/// Compound expressions hold an `Arc<Operator>`, so properties travel with
/// the tree and the matcher never performs a lookup.
#[derive(Debug)]
pub struct Operator {
    pub symbol: Symbol,
    pub props: SymbolProps,
}

impl Operator {
    pub fn new(symbol: impl Into<Symbol>, props: SymbolProps) -> Arc<Self> {
        Arc::new(Self { symbol: symbol.into(), props })
    }

    pub fn name(&self) -> &str {
        self.symbol.as_str()
    }

    pub fn is_commutative(&self) -> bool {
        self.props.matcher_class == MatcherClass::Commutative
    }

    pub fn is_extractor_backed(&self) -> bool {
        self.props.matcher_class == MatcherClass::ExtractorBacked
    }
}

/// Symbol/property lookup capability supplied by the construction phase.
pub trait SymbolResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Arc<Operator>>;
}

/// Table-backed [`SymbolResolver`].
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    operators: HashMap<Symbol, Arc<Operator>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operator. Returns `false` if the symbol was already present.
    pub(crate) fn insert(&mut self, op: Arc<Operator>) -> bool {
        if self.operators.contains_key(&op.symbol) {
            return false;
        }
        self.operators.insert(op.symbol.clone(), op);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Operator>> {
        self.operators.get(name)
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.operators.keys()
    }
}

impl SymbolResolver for SymbolTable {
    fn resolve(&self, name: &str) -> Option<Arc<Operator>> {
        self.get(name).cloned()
    }
}
